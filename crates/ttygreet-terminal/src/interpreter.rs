//! Command trait, registry, and per-call session context.
//!
//! A command has three capability slots: `execute` (required), `help`
//! (optional manual text), and `challenge` (optional secret follow-up).
//! Commands are validated once when they enter the registry; anything the
//! registry hands out is dispatchable.

use std::collections::HashMap;

use ttygreet_types::error::{GreeterError, Result};

use crate::auth::{AuthSlot, Authenticator};
use crate::sink::Sink;

/// Result of running a command's `execute` slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// The command failed; the message goes to the error sink.
    Failure(String),
    /// The command succeeded. `None` renders nothing.
    Success(Option<String>),
    /// The command needs a masked follow-up line before it can finish.
    NeedsSecret(Option<String>),
}

impl ExecutionResult {
    /// Successful result with visible text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Success(Some(text.into()))
    }

    /// Successful result that renders nothing.
    pub fn silent() -> Self {
        Self::Success(None)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }
}

/// Outcome of a challenge (secret) response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeResult {
    Accepted,
    Rejected,
    /// Verification continues asynchronously; the authenticator will signal
    /// completion later.
    Pending,
}

impl From<bool> for ChallengeResult {
    fn from(accepted: bool) -> Self {
        if accepted {
            Self::Accepted
        } else {
            Self::Rejected
        }
    }
}

/// Per-session state lent to a command for the duration of one call.
pub struct SessionContext<'a> {
    /// Session key that will be started after a successful login.
    pub session: &'a mut Option<String>,
    /// Output / error / mode channel toward the presentation layer.
    pub sink: &'a mut dyn Sink,
    /// Read-only view of the registry (for `help`, `man`).
    pub registry: &'a CommandRegistry,
    /// External user directory and authenticator.
    pub authenticator: &'a mut dyn Authenticator,
    pub(crate) auth: &'a mut AuthSlot,
}

impl SessionContext<'_> {
    /// Start authenticating `username`, cancelling any attempt already in
    /// flight first. Only one attempt may be outstanding at a time.
    pub fn begin_authentication(&mut self, username: &str) -> Result<()> {
        if self.auth.is_active() || self.authenticator.in_authentication() {
            log::debug!("Cancelling outstanding authentication before starting a new one");
            self.authenticator.cancel_authentication();
            self.auth.close();
        }
        let completion = self.auth.open();
        if let Err(e) = self.authenticator.start_authentication(username, completion) {
            self.auth.close();
            return Err(e);
        }
        log::debug!("Authentication started for {username}");
        Ok(())
    }

    /// Queue `secret` for delivery to the authenticator once the response
    /// delay has elapsed. The engine forwards it from `poll`.
    pub fn schedule_response(&mut self, secret: &str) {
        self.auth.schedule(secret);
    }
}

/// The optional secret follow-up of a command.
pub trait Challenge {
    /// Consume the masked line typed after the command requested a secret.
    fn respond(
        &self,
        secret: &str,
        prior: &ExecutionResult,
        ctx: &mut SessionContext<'_>,
    ) -> ChallengeResult;
}

/// A single dispatchable command.
pub trait Command {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// One-line description.
    fn description(&self) -> &str;

    /// Usage string (e.g. "login \[user\]").
    fn usage(&self) -> &str;

    /// Manual page shown by `man`. Commands without one have no entry.
    fn help(&self) -> Option<String> {
        None
    }

    /// Execute the command with the given arguments.
    fn execute(&self, args: &[&str], ctx: &mut SessionContext<'_>) -> Result<ExecutionResult>;

    /// The secret follow-up slot, if this command has one.
    fn challenge(&self) -> Option<&dyn Challenge> {
        None
    }
}

type ExecuteFn = Box<dyn Fn(&[&str], &mut SessionContext<'_>) -> Result<ExecutionResult>>;
type HelpFn = Box<dyn Fn() -> String>;
type ChallengeFn = Box<dyn Fn(&str, &ExecutionResult, &mut SessionContext<'_>) -> ChallengeResult>;

/// Builds a [`FnCommand`] from closures, one per capability slot.
///
/// `build` fails with a validation error when the `execute` slot was never
/// filled, so a half-built command can never reach the registry.
pub struct CommandBuilder {
    name: String,
    description: String,
    usage: String,
    execute: Option<ExecuteFn>,
    help: Option<HelpFn>,
    challenge: Option<ChallengeFn>,
}

impl CommandBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            usage: name.clone(),
            name,
            description: String::new(),
            execute: None,
            help: None,
            challenge: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn execute<F>(mut self, f: F) -> Self
    where
        F: Fn(&[&str], &mut SessionContext<'_>) -> Result<ExecutionResult> + 'static,
    {
        self.execute = Some(Box::new(f));
        self
    }

    pub fn help<F>(mut self, f: F) -> Self
    where
        F: Fn() -> String + 'static,
    {
        self.help = Some(Box::new(f));
        self
    }

    pub fn challenge<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &ExecutionResult, &mut SessionContext<'_>) -> ChallengeResult + 'static,
    {
        self.challenge = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Result<FnCommand> {
        let execute = self.execute.ok_or_else(|| {
            GreeterError::Validation(format!("command '{}' has no execute slot", self.name))
        })?;
        Ok(FnCommand {
            name: self.name,
            description: self.description,
            usage: self.usage,
            execute,
            help: self.help,
            challenge: self.challenge.map(FnChallenge),
        })
    }
}

/// A command assembled from closures by [`CommandBuilder`].
pub struct FnCommand {
    name: String,
    description: String,
    usage: String,
    execute: ExecuteFn,
    help: Option<HelpFn>,
    challenge: Option<FnChallenge>,
}

struct FnChallenge(ChallengeFn);

impl Challenge for FnChallenge {
    fn respond(
        &self,
        secret: &str,
        prior: &ExecutionResult,
        ctx: &mut SessionContext<'_>,
    ) -> ChallengeResult {
        (self.0)(secret, prior, ctx)
    }
}

impl Command for FnCommand {
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn usage(&self) -> &str {
        &self.usage
    }
    fn help(&self) -> Option<String> {
        self.help.as_ref().map(|f| f())
    }
    fn execute(&self, args: &[&str], ctx: &mut SessionContext<'_>) -> Result<ExecutionResult> {
        (self.execute)(args, ctx)
    }
    fn challenge(&self) -> Option<&dyn Challenge> {
        self.challenge.as_ref().map(|c| c as &dyn Challenge)
    }
}

/// Registry of dispatchable commands.
///
/// Names are case-sensitive and listed in first-insertion order.
/// Re-inserting a name replaces the command but keeps its position.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
    order: Vec<String>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a command under its own name.
    pub fn register(&mut self, cmd: Box<dyn Command>) -> Result<()> {
        let name = cmd.name().to_string();
        self.insert(&name, cmd)
    }

    /// Insert `cmd` under `name`, replacing any existing entry.
    pub fn insert(&mut self, name: &str, cmd: Box<dyn Command>) -> Result<()> {
        validate_name(name)?;
        if self.commands.insert(name.to_string(), cmd).is_none() {
            self.order.push(name.to_string());
        } else {
            log::debug!("Replaced command {name}");
        }
        Ok(())
    }

    /// Build a closure-based command and register it under its own name.
    pub fn define(&mut self, builder: CommandBuilder) -> Result<()> {
        let cmd = builder.build()?;
        self.register(Box::new(cmd))
    }

    /// Remove a command. Removing an absent name is a no-op.
    pub fn remove(&mut self, name: &str) {
        if self.commands.remove(name).is_some() {
            self.order.retain(|n| n != name);
        }
    }

    /// Look up a command by exact name.
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|cmd| cmd.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// All command names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Command names starting with `prefix` (case-sensitive), in listing
    /// order. An empty prefix matches everything.
    pub fn suggest(&self, prefix: &str) -> Vec<&str> {
        self.order
            .iter()
            .filter(|name| name.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(GreeterError::Validation(
            "command name must not be empty".to_string(),
        ));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(GreeterError::Validation(format!(
            "command name '{name}' contains whitespace"
        )));
    }
    Ok(())
}

/// Split a submitted line into command name and arguments.
///
/// Whitespace-delimited, no quoting. An empty line yields an empty name.
pub fn split_line(line: &str) -> (&str, Vec<&str>) {
    let mut tokens = line.split_whitespace();
    let name = tokens.next().unwrap_or("");
    (name, tokens.collect())
}
