//! Greeter configuration.
//!
//! Loaded from `ttygreet.toml` (or a `.json` file with the same shape).
//! Every field has a default so a partial or empty file is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GreeterError, Result};

/// Top-level greeter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreeterConfig {
    /// Host name shown in the prompt.
    #[serde(default = "default_hostname")]
    pub hostname: String,
    #[serde(default)]
    pub terminal: TerminalConfig,
    /// Users and sessions for the static directory backend.
    #[serde(default)]
    pub directory: DirectoryConfig,
}

/// Behaviour of the terminal engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Delay before a secret is forwarded to the authenticator.
    #[serde(default = "default_response_delay_ms")]
    pub response_delay_ms: u64,
    /// Maximum retained history entries (0 = unbounded).
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Maximum retained scrollback lines (0 = unbounded).
    #[serde(default = "default_scrollback_limit")]
    pub scrollback_limit: usize,
    /// Echo `<prompt><line>` for each submitted command.
    #[serde(default = "default_true")]
    pub echo_input: bool,
    /// Prompt shown while a secret is being typed.
    #[serde(default = "default_secret_prompt")]
    pub secret_prompt: String,
    /// Run `motd` once at boot when it is registered.
    #[serde(default = "default_true")]
    pub show_motd: bool,
}

/// A static user/session directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub default_session: Option<String>,
    #[serde(default)]
    pub sessions: Vec<SessionEntry>,
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

/// A desktop session that can be started after login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A user known to the static directory.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEntry {
    pub name: String,
    #[serde(default)]
    pub password: String,
    /// Preferred session key.
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub logged_in: bool,
}

impl std::fmt::Debug for UserEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserEntry")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .field("session", &self.session)
            .field("logged_in", &self.logged_in)
            .finish()
    }
}

fn default_hostname() -> String {
    "ttygreet".to_string()
}
fn default_response_delay_ms() -> u64 {
    200
}
fn default_history_limit() -> usize {
    100
}
fn default_scrollback_limit() -> usize {
    1000
}
fn default_true() -> bool {
    true
}
fn default_secret_prompt() -> String {
    "password:".to_string()
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            response_delay_ms: default_response_delay_ms(),
            history_limit: default_history_limit(),
            scrollback_limit: default_scrollback_limit(),
            echo_input: true,
            secret_prompt: default_secret_prompt(),
            show_motd: true,
        }
    }
}

impl Default for GreeterConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            terminal: TerminalConfig::default(),
            directory: DirectoryConfig::default(),
        }
    }
}

impl GreeterConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, choosing the format by extension (`.json` or TOML).
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json(&text)?
        } else {
            Self::from_toml(&text)?
        };
        log::debug!(
            "Loaded config from {}: {} users, {} sessions",
            path.display(),
            config.directory.users.len(),
            config.directory.sessions.len(),
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.hostname.trim().is_empty() {
            return Err(GreeterError::Config("hostname must not be empty".into()));
        }
        if let Some(user) = self.directory.users.iter().find(|u| u.name.is_empty()) {
            return Err(GreeterError::Config(format!(
                "user entry with empty name (session {:?})",
                user.session
            )));
        }
        if let Some(default) = &self.directory.default_session
            && !self.directory.sessions.is_empty()
            && !self.directory.sessions.iter().any(|s| &s.key == default)
        {
            return Err(GreeterError::Config(format!(
                "default_session '{default}' is not a listed session"
            )));
        }
        Ok(())
    }
}
