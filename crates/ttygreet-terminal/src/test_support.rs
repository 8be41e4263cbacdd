//! Recording sink and scripted authenticator shared by the unit tests.

use ttygreet_types::error::{GreeterError, Result};
use ttygreet_types::input::InputMode;

use crate::auth::{Authenticator, CompletionHandle, SessionInfo, User};
use crate::sink::Sink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Output(String),
    Error(String),
    Mode(InputMode),
    Clear,
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn outputs(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Output(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Error(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn modes(&self) -> Vec<InputMode> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Mode(m) => Some(*m),
                _ => None,
            })
            .collect()
    }

    pub fn take(&mut self) -> Vec<SinkEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Sink for RecordingSink {
    fn write_output(&mut self, text: &str) {
        self.events.push(SinkEvent::Output(text.to_string()));
    }
    fn write_error(&mut self, text: &str) {
        self.events.push(SinkEvent::Error(text.to_string()));
    }
    fn set_input_mode(&mut self, mode: InputMode) {
        self.events.push(SinkEvent::Mode(mode));
    }
    fn clear(&mut self) {
        self.events.push(SinkEvent::Clear);
    }
}

/// Authenticator that records every call (never the secret itself) and
/// either completes inside `respond` or waits for `finish`.
#[derive(Debug)]
pub struct FakeAuthenticator {
    pub users: Vec<User>,
    pub sessions: Vec<SessionInfo>,
    pub password: String,
    pub calls: Vec<String>,
    /// Resolve attempts inside `respond`.
    pub complete_on_respond: bool,
    pub fail_respond: bool,
    in_authentication: bool,
    authenticated: bool,
    completion: Option<CompletionHandle>,
}

impl FakeAuthenticator {
    pub fn new() -> Self {
        Self {
            users: vec![
                User {
                    name: "alice".into(),
                    session: Some("sway".into()),
                    logged_in: false,
                },
                User {
                    name: "bob".into(),
                    session: None,
                    logged_in: false,
                },
            ],
            sessions: vec![
                SessionInfo {
                    key: "xfce".into(),
                    name: "Xfce Session".into(),
                },
                SessionInfo {
                    key: "sway".into(),
                    name: "Sway".into(),
                },
            ],
            password: "right".into(),
            calls: Vec::new(),
            complete_on_respond: true,
            fail_respond: false,
            in_authentication: false,
            authenticated: false,
            completion: None,
        }
    }

    /// Resolve the outstanding attempt from "outside" with the given verdict.
    /// Returns whether anyone was still listening.
    pub fn finish(&mut self, authenticated: bool) -> bool {
        self.authenticated = authenticated;
        self.in_authentication = false;
        self.completion
            .take()
            .is_some_and(|handle| handle.complete())
    }

    pub fn calls_matching(&self, prefix: &str) -> Vec<&str> {
        self.calls
            .iter()
            .map(String::as_str)
            .filter(|c| c.starts_with(prefix))
            .collect()
    }
}

impl Authenticator for FakeAuthenticator {
    fn users(&self) -> Vec<User> {
        self.users.clone()
    }

    fn sessions(&self) -> Vec<SessionInfo> {
        self.sessions.clone()
    }

    fn default_session(&self) -> Option<String> {
        Some("xfce".into())
    }

    fn start_authentication(
        &mut self,
        username: &str,
        completion: CompletionHandle,
    ) -> Result<()> {
        self.calls.push(format!("start:{username}"));
        self.in_authentication = true;
        self.authenticated = false;
        self.completion = Some(completion);
        Ok(())
    }

    fn cancel_authentication(&mut self) {
        self.calls.push("cancel".into());
        self.in_authentication = false;
        self.completion = None;
    }

    fn respond(&mut self, secret: &str) -> Result<()> {
        self.calls.push("respond".into());
        if self.fail_respond {
            return Err(GreeterError::Authenticator("respond failed".into()));
        }
        if self.complete_on_respond {
            let ok = secret == self.password;
            self.finish(ok);
        }
        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn in_authentication(&self) -> bool {
        self.in_authentication
    }

    fn start_session(&mut self, key: &str) -> Result<()> {
        self.calls.push(format!("start_session:{key}"));
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.calls.push("shutdown".into());
        Ok(())
    }

    fn restart(&mut self) -> Result<()> {
        self.calls.push("restart".into());
        Ok(())
    }

    fn suspend(&mut self) -> Result<()> {
        self.calls.push("suspend".into());
        Ok(())
    }
}
