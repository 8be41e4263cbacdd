//! Built-in commands for the greeter terminal.

use ttygreet_types::error::{GreeterError, Result};

use crate::interpreter::{Command, CommandRegistry, ExecutionResult, SessionContext};

/// Register all built-in commands into a registry.
pub fn register_builtins(reg: &mut CommandRegistry) -> Result<()> {
    crate::auth_commands::register_auth_commands(reg)?;
    reg.register(Box::new(UsersCmd))?;
    reg.register(Box::new(LsCmd))?;
    reg.register(Box::new(SessionCmd))?;
    crate::system_commands::register_system_commands(reg)?;
    reg.register(Box::new(ClearCmd))?;
    reg.register(Box::new(HelpCmd))?;
    reg.register(Box::new(ManCmd))?;
    reg.register(Box::new(MotdCmd))?;
    Ok(())
}

/// Manual page in the usual NAME / SYNOPSIS / DESCRIPTION layout.
pub(crate) fn manual(cmd: &dyn Command) -> String {
    format!(
        "NAME\n    {}\n\nSYNOPSIS\n    {}\n\nDESCRIPTION\n    {}",
        cmd.name(),
        cmd.usage(),
        cmd.description()
    )
}

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

struct UsersCmd;
impl Command for UsersCmd {
    fn name(&self) -> &str {
        "users"
    }
    fn description(&self) -> &str {
        "List out all available users."
    }
    fn usage(&self) -> &str {
        "users"
    }
    fn help(&self) -> Option<String> {
        Some(manual(self))
    }
    fn execute(&self, _args: &[&str], ctx: &mut SessionContext<'_>) -> Result<ExecutionResult> {
        let users = ctx.authenticator.users();
        if users.is_empty() {
            return Ok(ExecutionResult::text("(no users)"));
        }
        let names: Vec<String> = users.into_iter().map(|u| u.name).collect();
        Ok(ExecutionResult::text(names.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// ls
// ---------------------------------------------------------------------------

struct LsCmd;
impl Command for LsCmd {
    fn name(&self) -> &str {
        "ls"
    }
    fn description(&self) -> &str {
        "List out all available sessions."
    }
    fn usage(&self) -> &str {
        "ls"
    }
    fn help(&self) -> Option<String> {
        Some(manual(self))
    }
    fn execute(&self, _args: &[&str], ctx: &mut SessionContext<'_>) -> Result<ExecutionResult> {
        let sessions = ctx.authenticator.sessions();
        if sessions.is_empty() {
            return Ok(ExecutionResult::text("(no sessions)"));
        }
        let keys: Vec<String> = sessions.into_iter().map(|s| s.key).collect();
        Ok(ExecutionResult::text(keys.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// session
// ---------------------------------------------------------------------------

struct SessionCmd;
impl Command for SessionCmd {
    fn name(&self) -> &str {
        "session"
    }
    fn description(&self) -> &str {
        "Set the session to login to."
    }
    fn usage(&self) -> &str {
        "session [NAME]"
    }
    fn help(&self) -> Option<String> {
        Some(manual(self))
    }
    fn execute(&self, args: &[&str], ctx: &mut SessionContext<'_>) -> Result<ExecutionResult> {
        let Some(&key) = args.first() else {
            return Ok(ExecutionResult::failure("usage: session [NAME]"));
        };
        if !ctx.authenticator.sessions().iter().any(|s| s.key == key) {
            return Err(GreeterError::Lookup(format!("no such session: {key}")));
        }
        *ctx.session = Some(key.to_string());
        Ok(ExecutionResult::silent())
    }
}

// ---------------------------------------------------------------------------
// clear
// ---------------------------------------------------------------------------

struct ClearCmd;
impl Command for ClearCmd {
    fn name(&self) -> &str {
        "clear"
    }
    fn description(&self) -> &str {
        "Clear the terminal screen."
    }
    fn usage(&self) -> &str {
        "clear"
    }
    fn help(&self) -> Option<String> {
        Some(manual(self))
    }
    fn execute(&self, _args: &[&str], ctx: &mut SessionContext<'_>) -> Result<ExecutionResult> {
        ctx.sink.clear();
        Ok(ExecutionResult::silent())
    }
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

struct HelpCmd;
impl Command for HelpCmd {
    fn name(&self) -> &str {
        "help"
    }
    fn description(&self) -> &str {
        "List available commands."
    }
    fn usage(&self) -> &str {
        "help"
    }
    fn execute(&self, _args: &[&str], ctx: &mut SessionContext<'_>) -> Result<ExecutionResult> {
        Ok(ExecutionResult::text(ctx.registry.names().join("   ")))
    }
}

// ---------------------------------------------------------------------------
// man
// ---------------------------------------------------------------------------

struct ManCmd;
impl Command for ManCmd {
    fn name(&self) -> &str {
        "man"
    }
    fn description(&self) -> &str {
        "A reference manual to give information about a specific command."
    }
    fn usage(&self) -> &str {
        "man [COMMAND]"
    }
    fn help(&self) -> Option<String> {
        Some(manual(self))
    }
    fn execute(&self, args: &[&str], ctx: &mut SessionContext<'_>) -> Result<ExecutionResult> {
        let Some(&topic) = args.first() else {
            return Ok(ExecutionResult::failure("What manual page do you want?"));
        };
        match ctx.registry.get(topic).and_then(|cmd| cmd.help()) {
            Some(page) => Ok(ExecutionResult::text(page)),
            None => Ok(ExecutionResult::failure(format!(
                "No manual entry for {topic}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// motd
// ---------------------------------------------------------------------------

const BANNER: &str = r" _   _
| |_| |_ _   _  __ _ _ __ ___  ___| |_
| __| __| | | |/ _` | '__/ _ \/ _ \ __|
| |_| |_| |_| | (_| | | |  __/  __/ |_
 \__|\__|\__, |\__, |_|  \___|\___|\__|
         |___/ |___/";

struct MotdCmd;
impl Command for MotdCmd {
    fn name(&self) -> &str {
        "motd"
    }
    fn description(&self) -> &str {
        "Display the current motd"
    }
    fn usage(&self) -> &str {
        "motd"
    }
    fn help(&self) -> Option<String> {
        Some(manual(self))
    }
    fn execute(&self, _args: &[&str], _ctx: &mut SessionContext<'_>) -> Result<ExecutionResult> {
        Ok(ExecutionResult::text(BANNER))
    }
}

#[cfg(test)]
mod tests {
    use ttygreet_types::config::TerminalConfig;

    use super::*;
    use crate::session::SessionEngine;
    use crate::test_support::{FakeAuthenticator, RecordingSink, SinkEvent};

    fn engine() -> SessionEngine<FakeAuthenticator, RecordingSink> {
        let mut reg = CommandRegistry::new();
        register_builtins(&mut reg).unwrap();
        let config = TerminalConfig {
            response_delay_ms: 0,
            echo_input: false,
            show_motd: false,
            ..TerminalConfig::default()
        };
        SessionEngine::new(
            reg,
            FakeAuthenticator::new(),
            RecordingSink::default(),
            "box",
            config,
        )
    }

    #[test]
    fn builtins_register_in_order() {
        let mut reg = CommandRegistry::new();
        register_builtins(&mut reg).unwrap();
        assert_eq!(
            reg.names(),
            vec![
                "login", "passwd", "users", "ls", "session", "poweroff", "reboot", "suspend",
                "clear", "help", "man", "motd",
            ]
        );
    }

    #[test]
    fn help_lists_every_command() {
        let mut e = engine();
        e.submit("help");
        let out = e.sink().outputs()[0].to_string();
        for name in e.registry().names() {
            assert!(out.contains(name), "help output missing {name}");
        }
    }

    #[test]
    fn help_skips_removed_commands() {
        let mut e = engine();
        e.registry_mut().remove("suspend");
        e.submit("help");
        assert!(!e.sink().outputs()[0].contains("suspend"));
    }

    #[test]
    fn users_lists_names() {
        let mut e = engine();
        e.submit("users");
        assert_eq!(e.sink().outputs(), vec!["alice\nbob"]);
    }

    #[test]
    fn ls_lists_session_keys() {
        let mut e = engine();
        e.submit("ls");
        assert_eq!(e.sink().outputs(), vec!["xfce\nsway"]);
    }

    #[test]
    fn session_selects_known_key() {
        let mut e = engine();
        e.submit("session sway");
        assert!(e.sink().events.is_empty());
        assert_eq!(e.selected_session(), Some("sway"));
    }

    #[test]
    fn session_rejects_unknown_key() {
        let mut e = engine();
        e.submit("session kde");
        assert_eq!(e.sink().errors(), vec!["no such session: kde"]);
        assert_eq!(e.selected_session(), Some("xfce"));
    }

    #[test]
    fn session_without_argument() {
        let mut e = engine();
        e.submit("session");
        assert!(e.sink().errors()[0].starts_with("usage"));
    }

    #[test]
    fn clear_wipes_sink() {
        let mut e = engine();
        e.submit("clear");
        assert_eq!(e.sink().events, vec![SinkEvent::Clear]);
    }

    #[test]
    fn man_shows_manual() {
        let mut e = engine();
        e.submit("man login");
        let page = e.sink().outputs()[0];
        assert!(page.contains("NAME"));
        assert!(page.contains("login [USER]"));
    }

    #[test]
    fn man_without_topic() {
        let mut e = engine();
        e.submit("man");
        assert_eq!(e.sink().errors(), vec!["What manual page do you want?"]);
    }

    #[test]
    fn man_unknown_or_without_help() {
        let mut e = engine();
        e.submit("man nothing");
        e.submit("man help");
        assert_eq!(
            e.sink().errors(),
            vec!["No manual entry for nothing", "No manual entry for help"]
        );
    }

    #[test]
    fn motd_prints_banner() {
        let mut e = engine();
        e.boot();
        assert!(e.sink().events.is_empty());
        e.submit("motd");
        assert!(e.sink().outputs()[0].contains("|___/"));
    }
}
