//! Error types for ttygreet.

use std::io;

/// Errors produced by the greeter terminal.
#[derive(Debug, thiserror::Error)]
pub enum GreeterError {
    /// A command, user, or session name did not resolve.
    #[error("{0}")]
    Lookup(String),

    /// A command was rejected at registration time.
    #[error("validation error: {0}")]
    Validation(String),

    /// A challenge response was rejected.
    #[error("{0}")]
    Authentication(String),

    /// A command asked for a secret it has no way to consume.
    #[error("protocol misuse: {0}")]
    ProtocolMisuse(String),

    #[error("{0}")]
    Command(String),

    /// The external authenticator reported a failure.
    #[error("authenticator error: {0}")]
    Authenticator(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, GreeterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_error_display_is_bare_message() {
        let e = GreeterError::Lookup("command not found: foo".into());
        assert_eq!(format!("{e}"), "command not found: foo");
    }

    #[test]
    fn validation_error_display() {
        let e = GreeterError::Validation("missing execute".into());
        assert_eq!(format!("{e}"), "validation error: missing execute");
    }

    #[test]
    fn authentication_error_display() {
        let e = GreeterError::Authentication("incorrect credentials".into());
        assert_eq!(format!("{e}"), "incorrect credentials");
    }

    #[test]
    fn protocol_misuse_display() {
        let e = GreeterError::ProtocolMisuse("login".into());
        assert_eq!(format!("{e}"), "protocol misuse: login");
    }

    #[test]
    fn authenticator_error_display() {
        let e = GreeterError::Authenticator("daemon gone".into());
        assert_eq!(format!("{e}"), "authenticator error: daemon gone");
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: GreeterError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let toml_err = toml::from_str::<toml::Value>("this is [[[not valid toml").unwrap_err();
        let e: GreeterError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let e: GreeterError = json_err.into();
        assert!(format!("{e}").contains("JSON error"));
    }

    #[test]
    fn error_is_debug() {
        let e = GreeterError::Command("test".into());
        assert!(format!("{e:?}").contains("Command"));
    }
}
