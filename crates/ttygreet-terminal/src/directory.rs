//! In-memory user directory and authenticator built from configuration.
//!
//! Attempts resolve synchronously inside `respond`, which makes this the
//! backend for the desktop host and for end-to-end tests.

use ttygreet_types::config::{DirectoryConfig, SessionEntry, UserEntry};
use ttygreet_types::error::{GreeterError, Result};

use crate::auth::{Authenticator, CompletionHandle, SessionInfo, User};

/// Power action requested through the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    Shutdown,
    Restart,
    Suspend,
}

struct Attempt {
    username: String,
    completion: CompletionHandle,
}

/// A fixed set of users and sessions with plaintext credentials.
pub struct StaticDirectory {
    users: Vec<UserEntry>,
    sessions: Vec<SessionEntry>,
    default_session: Option<String>,
    attempt: Option<Attempt>,
    authenticated: Option<String>,
    active_session: Option<String>,
    power_action: Option<PowerAction>,
}

impl StaticDirectory {
    pub fn new(config: &DirectoryConfig) -> Self {
        Self {
            users: config.users.clone(),
            sessions: config.sessions.clone(),
            default_session: config.default_session.clone(),
            attempt: None,
            authenticated: None,
            active_session: None,
            power_action: None,
        }
    }

    /// User whose last attempt succeeded.
    pub fn authenticated_user(&self) -> Option<&str> {
        self.authenticated.as_deref()
    }

    /// Session started after a successful login.
    pub fn active_session(&self) -> Option<&str> {
        self.active_session.as_deref()
    }

    pub fn power_action(&self) -> Option<PowerAction> {
        self.power_action
    }

    fn request_power(&mut self, action: PowerAction) -> Result<()> {
        log::info!("Power action requested: {action:?}");
        self.power_action = Some(action);
        Ok(())
    }
}

impl Authenticator for StaticDirectory {
    fn users(&self) -> Vec<User> {
        self.users
            .iter()
            .map(|u| User {
                name: u.name.clone(),
                session: u.session.clone(),
                logged_in: u.logged_in,
            })
            .collect()
    }

    fn sessions(&self) -> Vec<SessionInfo> {
        self.sessions
            .iter()
            .map(|s| SessionInfo {
                key: s.key.clone(),
                name: s.name.clone().unwrap_or_else(|| s.key.clone()),
            })
            .collect()
    }

    fn default_session(&self) -> Option<String> {
        self.default_session
            .clone()
            .or_else(|| self.sessions.first().map(|s| s.key.clone()))
    }

    fn start_authentication(
        &mut self,
        username: &str,
        completion: CompletionHandle,
    ) -> Result<()> {
        if !self.users.iter().any(|u| u.name == username) {
            return Err(GreeterError::Authenticator(format!(
                "unknown user: {username}"
            )));
        }
        self.authenticated = None;
        self.attempt = Some(Attempt {
            username: username.to_string(),
            completion,
        });
        Ok(())
    }

    fn cancel_authentication(&mut self) {
        if let Some(attempt) = self.attempt.take() {
            log::debug!("Authentication for {} cancelled", attempt.username);
        }
    }

    fn respond(&mut self, secret: &str) -> Result<()> {
        let attempt = self.attempt.take().ok_or_else(|| {
            GreeterError::Authenticator("no authentication in progress".to_string())
        })?;
        let accepted = self
            .users
            .iter()
            .any(|u| u.name == attempt.username && u.password == secret);
        if accepted {
            self.authenticated = Some(attempt.username.clone());
        } else {
            log::info!("Authentication failed for {}", attempt.username);
        }
        if !attempt.completion.complete() {
            log::debug!("Nobody waiting on completion for {}", attempt.username);
        }
        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated.is_some()
    }

    fn in_authentication(&self) -> bool {
        self.attempt.is_some()
    }

    fn start_session(&mut self, key: &str) -> Result<()> {
        let user = self.authenticated.as_deref().ok_or_else(|| {
            GreeterError::Authenticator("cannot start a session before login".to_string())
        })?;
        if !self.sessions.is_empty() && !self.sessions.iter().any(|s| s.key == key) {
            return Err(GreeterError::Lookup(format!("no such session: {key}")));
        }
        log::info!("Starting session {key} for {user}");
        self.active_session = Some(key.to_string());
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.request_power(PowerAction::Shutdown)
    }

    fn restart(&mut self) -> Result<()> {
        self.request_power(PowerAction::Restart)
    }

    fn suspend(&mut self) -> Result<()> {
        self.request_power(PowerAction::Suspend)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::auth::AuthSlot;

    fn config() -> DirectoryConfig {
        DirectoryConfig {
            default_session: None,
            sessions: vec![
                SessionEntry {
                    key: "xfce".into(),
                    name: Some("Xfce Session".into()),
                },
                SessionEntry {
                    key: "sway".into(),
                    name: None,
                },
            ],
            users: vec![UserEntry {
                name: "alice".into(),
                password: "wonderland".into(),
                session: Some("sway".into()),
                logged_in: false,
            }],
        }
    }

    #[test]
    fn lists_users_and_sessions() {
        let dir = StaticDirectory::new(&config());
        assert_eq!(dir.users()[0].name, "alice");
        assert_eq!(dir.users()[0].session.as_deref(), Some("sway"));
        let sessions = dir.sessions();
        assert_eq!(sessions[0].name, "Xfce Session");
        assert_eq!(sessions[1].name, "sway");
    }

    #[test]
    fn default_session_falls_back_to_first() {
        let dir = StaticDirectory::new(&config());
        assert_eq!(dir.default_session().as_deref(), Some("xfce"));
    }

    #[test]
    fn correct_secret_authenticates_and_completes() {
        let mut slot = AuthSlot::new(Duration::ZERO);
        let mut dir = StaticDirectory::new(&config());
        dir.start_authentication("alice", slot.open()).unwrap();
        assert!(dir.in_authentication());
        dir.respond("wonderland").unwrap();
        assert!(!dir.in_authentication());
        assert!(dir.is_authenticated());
        assert_eq!(dir.authenticated_user(), Some("alice"));
        assert!(slot.poll_completion());
    }

    #[test]
    fn wrong_secret_completes_unauthenticated() {
        let mut slot = AuthSlot::new(Duration::ZERO);
        let mut dir = StaticDirectory::new(&config());
        dir.start_authentication("alice", slot.open()).unwrap();
        dir.respond("nope").unwrap();
        assert!(!dir.is_authenticated());
        assert!(slot.poll_completion());
    }

    #[test]
    fn unknown_user_is_rejected() {
        let mut slot = AuthSlot::new(Duration::ZERO);
        let mut dir = StaticDirectory::new(&config());
        assert!(dir.start_authentication("mallory", slot.open()).is_err());
        assert!(!dir.in_authentication());
    }

    #[test]
    fn respond_without_attempt_errors() {
        let mut dir = StaticDirectory::new(&config());
        assert!(matches!(
            dir.respond("x"),
            Err(GreeterError::Authenticator(_))
        ));
    }

    #[test]
    fn cancel_clears_attempt() {
        let mut slot = AuthSlot::new(Duration::ZERO);
        let mut dir = StaticDirectory::new(&config());
        dir.start_authentication("alice", slot.open()).unwrap();
        dir.cancel_authentication();
        assert!(!dir.in_authentication());
    }

    #[test]
    fn session_requires_login_and_known_key() {
        let mut slot = AuthSlot::new(Duration::ZERO);
        let mut dir = StaticDirectory::new(&config());
        assert!(dir.start_session("xfce").is_err());
        dir.start_authentication("alice", slot.open()).unwrap();
        dir.respond("wonderland").unwrap();
        assert!(matches!(
            dir.start_session("kde"),
            Err(GreeterError::Lookup(_))
        ));
        dir.start_session("sway").unwrap();
        assert_eq!(dir.active_session(), Some("sway"));
    }

    #[test]
    fn power_actions_are_recorded() {
        let mut dir = StaticDirectory::new(&config());
        dir.suspend().unwrap();
        assert_eq!(dir.power_action(), Some(PowerAction::Suspend));
        dir.shutdown().unwrap();
        assert_eq!(dir.power_action(), Some(PowerAction::Shutdown));
    }
}
