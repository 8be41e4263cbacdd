//! Session engine: line dispatch and the pending-authentication state
//! machine.
//!
//! The engine is `Idle` until a command asks for a secret, then
//! `AwaitingSecret` until the next submitted line is handed to that
//! command's challenge. A challenge that defers to the external
//! authenticator leaves the engine `Verifying` until the authenticator
//! signals completion; input is ignored meanwhile.

use std::time::{Duration, Instant};

use ttygreet_types::config::TerminalConfig;
use ttygreet_types::error::GreeterError;
use ttygreet_types::input::{InputMode, Key};

use crate::auth::{AuthSlot, Authenticator};
use crate::history::History;
use crate::interpreter::{
    ChallengeResult, CommandRegistry, ExecutionResult, SessionContext, split_line,
};
use crate::sink::Sink;

/// Message shown when a secret is rejected.
pub const INCORRECT_CREDENTIALS: &str = "incorrect credentials";

/// Externally visible engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingSecret,
    Verifying,
}

/// The command waiting for a secret, and what it returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAuth {
    pub command: String,
    pub prior: ExecutionResult,
    verifying: bool,
}

/// Owns the registry, history, input line, and collaborators of one
/// terminal session.
pub struct SessionEngine<A, S> {
    registry: CommandRegistry,
    history: History,
    authenticator: A,
    sink: S,
    auth: AuthSlot,
    pending: Option<PendingAuth>,
    selected_session: Option<String>,
    mode: InputMode,
    input: String,
    hostname: String,
    config: TerminalConfig,
}

impl<A: Authenticator, S: Sink> SessionEngine<A, S> {
    pub fn new(
        registry: CommandRegistry,
        authenticator: A,
        sink: S,
        hostname: impl Into<String>,
        config: TerminalConfig,
    ) -> Self {
        let selected_session = authenticator.default_session();
        Self {
            registry,
            history: History::with_limit(config.history_limit),
            authenticator,
            sink,
            auth: AuthSlot::new(Duration::from_millis(config.response_delay_ms)),
            pending: None,
            selected_session,
            mode: InputMode::Plain,
            input: String::new(),
            hostname: hostname.into(),
            config,
        }
    }

    /// Print the message of the day, if configured and registered.
    pub fn boot(&mut self) {
        if self.config.show_motd && self.registry.contains("motd") {
            self.dispatch("motd");
        }
    }

    // -- Accessors --

    pub fn state(&self) -> SessionState {
        match &self.pending {
            None => SessionState::Idle,
            Some(p) if p.verifying => SessionState::Verifying,
            Some(_) => SessionState::AwaitingSecret,
        }
    }

    pub fn pending(&self) -> Option<&PendingAuth> {
        self.pending.as_ref()
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Current contents of the input line.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn authenticator(&self) -> &A {
        &self.authenticator
    }

    pub fn authenticator_mut(&mut self) -> &mut A {
        &mut self.authenticator
    }

    /// Session that will be started after a successful login.
    pub fn selected_session(&self) -> Option<&str> {
        self.selected_session.as_deref()
    }

    /// Prompt for the input line.
    pub fn prompt(&self) -> String {
        if self.mode.is_masked() {
            return self.config.secret_prompt.clone();
        }
        match self.authenticator.users().into_iter().find(|u| u.logged_in) {
            Some(user) => format!("{}@{} $ ", user.name, self.hostname),
            None => format!("{} $ ", self.hostname),
        }
    }

    // -- Input surface --

    /// Feed one key press from the host.
    pub fn handle_key(&mut self, key: Key) {
        let masked = self.mode.is_masked();
        match key {
            Key::Char(c) => self.input.push(c),
            Key::Backspace => {
                self.input.pop();
            },
            Key::Enter => {
                let line = std::mem::take(&mut self.input);
                self.history.reset_cursor();
                self.submit(&line);
            },
            Key::Tab if !masked => {
                let completion = self
                    .registry
                    .suggest(&self.input)
                    .first()
                    .map(|name| name.to_string());
                if let Some(name) = completion {
                    self.input = name;
                }
            },
            Key::Up if !masked => {
                if let Some(line) = self.history.older() {
                    self.input = line.to_string();
                }
            },
            Key::Down if !masked => {
                if let Some(line) = self.history.newer() {
                    self.input = line.to_string();
                }
            },
            Key::Cancel => self.cancel(),
            Key::Tab | Key::Up | Key::Down => {},
        }
    }

    /// Handle a submitted line according to the current state.
    pub fn submit(&mut self, line: &str) {
        match self.state() {
            SessionState::Idle => {
                self.history.push(line);
                if self.config.echo_input {
                    let echo = format!("{}{line}", self.prompt());
                    self.sink.write_output(&echo);
                }
                self.dispatch(line);
            },
            SessionState::AwaitingSecret => self.answer_challenge(line),
            SessionState::Verifying => {
                log::debug!("Ignoring input while credentials are being verified");
            },
        }
    }

    /// Run a command line directly, bypassing history and the secret
    /// routing of `submit`. A command that asks for a secret here replaces
    /// any authentication already pending.
    pub fn execute(&mut self, line: &str) {
        self.dispatch(line);
    }

    /// Ctrl-C: drop the input line and abandon any authentication in
    /// progress without consulting the challenge.
    pub fn cancel(&mut self) {
        self.input.clear();
        self.history.reset_cursor();
        if self.pending.is_some() || self.auth.is_active() {
            if self.auth.has_scheduled() {
                log::debug!("Discarding response that was not yet forwarded");
            }
            log::debug!("Authentication cancelled");
            self.cancel_attempt();
        }
        self.leave_secret_mode();
    }

    /// Drive deferred work: forward a due secret to the authenticator and
    /// pick up its completion signal.
    pub fn poll(&mut self, now: Instant) {
        if let Some(secret) = self.auth.take_due(now)
            && let Err(e) = self.authenticator.respond(&secret)
        {
            log::error!("Forwarding response failed: {e}");
            self.cancel_attempt();
            self.leave_secret_mode();
            self.sink.write_error(&e.to_string());
            return;
        }
        if self.auth.poll_completion() {
            self.authentication_complete();
        }
    }

    /// Completion entry point for the external authenticator.
    ///
    /// Starts the selected session on success; reports incorrect
    /// credentials otherwise. Either way the engine returns to `Idle`.
    pub fn authentication_complete(&mut self) {
        if !self.auth.is_active() && self.pending.is_none() {
            log::warn!("Ignoring authentication completion with no attempt in progress");
            return;
        }
        self.auth.close();
        self.leave_secret_mode();

        if !self.authenticator.is_authenticated() {
            self.report_rejection();
            return;
        }
        let session = self
            .selected_session
            .clone()
            .or_else(|| self.authenticator.default_session());
        match session {
            Some(key) => {
                if let Err(e) = self.authenticator.start_session(&key) {
                    log::error!("Failed to start session {key}: {e}");
                    self.sink.write_error(&e.to_string());
                }
            },
            None => self.sink.write_error("no session available to start"),
        }
    }

    // -- Dispatch --

    fn dispatch(&mut self, line: &str) {
        let (name, args) = split_line(line);
        let generation = self.auth.generation();

        let Self {
            registry,
            sink,
            authenticator,
            auth,
            selected_session,
            ..
        } = self;
        let Some(cmd) = registry.get(name) else {
            log::debug!("command not found: {name}");
            sink.write_error(&format!("command not found: {name}"));
            return;
        };
        let has_challenge = cmd.challenge().is_some();
        let mut ctx = SessionContext {
            session: &mut *selected_session,
            sink: &mut *sink,
            registry: &*registry,
            authenticator: &mut *authenticator,
            auth: &mut *auth,
        };
        let outcome = cmd.execute(&args, &mut ctx);
        log::debug!("Dispatched {name} ({} args)", args.len());

        match outcome {
            Err(e) => self.sink.write_error(&e.to_string()),
            Ok(ExecutionResult::Failure(message)) => self.sink.write_error(&message),
            Ok(prior @ ExecutionResult::Success(_)) if has_challenge => {
                self.enter_secret(name, prior, generation);
            },
            Ok(ExecutionResult::Success(Some(text))) => self.sink.write_output(&text),
            Ok(ExecutionResult::Success(None)) => {},
            Ok(prior @ ExecutionResult::NeedsSecret(_)) => {
                if has_challenge {
                    self.enter_secret(name, prior, generation);
                } else {
                    let err = GreeterError::ProtocolMisuse(format!(
                        "{name} asked for a secret but cannot accept one"
                    ));
                    log::error!("{err}");
                    self.sink.write_error(&err.to_string());
                }
            },
        }
    }

    fn enter_secret(&mut self, name: &str, prior: ExecutionResult, generation: u64) {
        if let Some(previous) = self.pending.take() {
            // An attempt opened for the replaced command is stale unless the
            // new command opened its own.
            if self.auth.generation() == generation && self.auth.is_active() {
                log::debug!("Cancelling authentication left over from {}", previous.command);
                self.cancel_attempt();
            }
        }
        self.pending = Some(PendingAuth {
            command: name.to_string(),
            prior,
            verifying: false,
        });
        self.set_mode(InputMode::Masked);
    }

    fn answer_challenge(&mut self, secret: &str) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        let Self {
            registry,
            sink,
            authenticator,
            auth,
            selected_session,
            ..
        } = self;
        let result = registry
            .get(&pending.command)
            .and_then(|cmd| cmd.challenge())
            .map(|challenge| {
                let mut ctx = SessionContext {
                    session: &mut *selected_session,
                    sink: &mut *sink,
                    registry: &*registry,
                    authenticator: &mut *authenticator,
                    auth: &mut *auth,
                };
                challenge.respond(secret, &pending.prior, &mut ctx)
            });

        match result {
            None => {
                log::warn!("{} is no longer available to take a secret", pending.command);
                self.cancel_attempt();
                self.leave_secret_mode();
                self.sink.write_error(&format!(
                    "authentication aborted: {} is no longer available",
                    pending.command
                ));
            },
            Some(ChallengeResult::Pending) => {
                // Only an open attempt can ever complete; without one the
                // next line goes back to the challenge.
                let verifying = self.auth.is_active();
                if !verifying {
                    log::debug!("{} deferred with no attempt open", pending.command);
                }
                self.pending = Some(PendingAuth {
                    verifying,
                    ..pending
                });
            },
            Some(ChallengeResult::Rejected) => {
                self.cancel_attempt();
                self.leave_secret_mode();
                self.report_rejection();
            },
            Some(ChallengeResult::Accepted) => self.leave_secret_mode(),
        }
    }

    /// Tell the authenticator to drop its attempt and close our channel.
    fn cancel_attempt(&mut self) {
        if self.auth.is_active() || self.authenticator.in_authentication() {
            self.authenticator.cancel_authentication();
        }
        self.auth.close();
    }

    fn report_rejection(&mut self) {
        let err = GreeterError::Authentication(INCORRECT_CREDENTIALS.to_string());
        log::info!("Authentication rejected");
        self.sink.write_error(&err.to_string());
    }

    fn leave_secret_mode(&mut self) {
        self.pending = None;
        self.set_mode(InputMode::Plain);
    }

    fn set_mode(&mut self, mode: InputMode) {
        if self.mode != mode {
            self.mode = mode;
            self.sink.set_input_mode(mode);
        }
    }
}
