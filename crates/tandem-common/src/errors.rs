use std::path::PathBuf;

use crate::types::SessionCode;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Per-message failures. None of these are fatal to a connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    #[error("session {0} is not joinable")]
    SessionNotJoinable(SessionCode),

    #[error("unknown session {0}")]
    UnknownSession(SessionCode),

    #[error("no free session codes")]
    CodesExhausted,
}

#[derive(Debug, thiserror::Error)]
pub enum TandemError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("network error: {0}")]
    Network(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("port = 0".into());
        assert_eq!(err.to_string(), "config validation error: port = 0");
    }

    #[test]
    fn protocol_error_display() {
        let code = SessionCode::from_number(4821);
        assert_eq!(
            ProtocolError::SessionNotJoinable(code.clone()).to_string(),
            "session 4821 is not joinable"
        );
        assert_eq!(
            ProtocolError::UnknownSession(code).to_string(),
            "unknown session 4821"
        );
        assert_eq!(
            ProtocolError::MalformedMessage("missing field `action`".into()).to_string(),
            "malformed message: missing field `action`"
        );
    }

    #[test]
    fn tandem_error_from_config() {
        let err: TandemError = ConfigError::ParseError("bad toml".into()).into();
        assert!(matches!(err, TandemError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn tandem_error_network() {
        let err = TandemError::Network("handshake failed".into());
        assert_eq!(err.to_string(), "network error: handshake failed");
    }
}
