//! Greeter terminal engine.
//!
//! The terminal is a registry-based dispatch system. Commands implement the
//! `Command` trait and are registered by name. The session engine parses
//! submitted lines, resolves the command name, and dispatches `execute()`.
//! A command may ask for a masked secret; the next line is then handed to
//! its challenge instead of being dispatched.

pub mod auth;
mod auth_commands;
mod commands;
pub mod directory;
pub mod history;
mod interpreter;
pub mod session;
pub mod sink;
mod system_commands;

#[cfg(test)]
mod test_support;

/// Register the login and passwd commands into a registry.
pub use auth_commands::register_auth_commands;
/// Register all built-in commands (auth, directory, power, help) into a registry.
pub use commands::register_builtins;
/// The optional secret follow-up of a command.
pub use interpreter::Challenge;
/// Outcome of a challenge response.
pub use interpreter::ChallengeResult;
/// A single executable command trait.
pub use interpreter::Command;
/// Closure-based command construction.
pub use interpreter::{CommandBuilder, FnCommand};
/// Registry of available commands.
pub use interpreter::CommandRegistry;
/// Result of a command's `execute` slot.
pub use interpreter::ExecutionResult;
/// Per-call state passed to every command.
pub use interpreter::SessionContext;
/// Split a raw line into command name and arguments.
pub use interpreter::split_line;
/// Register poweroff, reboot, and suspend into a registry.
pub use system_commands::register_system_commands;

pub use auth::{Authenticator, CompletionHandle, SessionInfo, User};
pub use directory::{PowerAction, StaticDirectory};
pub use history::History;
pub use session::{INCORRECT_CREDENTIALS, PendingAuth, SessionEngine, SessionState};
pub use sink::{Line, LineKind, Scrollback, Sink};
