// hiveq-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::remediation::{self, Remediation};

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- CONNECTION (driver setup / handshake) ---
    #[error("Failed to connect to Hive at {target}: {message}")]
    #[diagnostic(code(hiveq::infra::connection))]
    Connection {
        target: String,
        message: String,
        remediation: Option<Remediation>,
        #[help]
        hint: Option<String>,
    },

    // --- EXECUTION ---
    #[error("Query failed: {message}")]
    #[diagnostic(code(hiveq::infra::query))]
    Query {
        message: String,
        sql_state: Option<String>,
        #[help]
        hint: Option<String>,
    },

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(hiveq::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    #[error("CSV Write Error: {0}")]
    #[diagnostic(code(hiveq::infra::csv))]
    Csv(#[from] csv::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(hiveq::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Config file not found: {0}")]
    #[diagnostic(
        code(hiveq::infra::config_missing),
        help("Pass the right file with --config <PATH>.")
    )]
    ConfigNotFound(String),

    // --- DRIVER DOWNLOAD ---
    #[error("Download of {url} failed: {message}")]
    #[diagnostic(code(hiveq::infra::download))]
    Download { url: String, message: String },
}

impl InfrastructureError {
    /// Wraps a driver failure raised while opening a connection, attaching a
    /// remediation when the text points at SSL, Java or the driver jar.
    pub fn connection(target: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let remediation = remediation::classify(&message);
        Self::Connection {
            target: target.into(),
            hint: remediation.map(|r| r.hint().to_string()),
            message,
            remediation,
        }
    }

    pub fn connection_with(
        target: impl Into<String>,
        message: impl Into<String>,
        remediation: Remediation,
    ) -> Self {
        Self::Connection {
            target: target.into(),
            message: message.into(),
            remediation: Some(remediation),
            hint: Some(remediation.hint().to_string()),
        }
    }

    /// Query failures carry the server's text only; remediation hints are
    /// reserved for connection setup.
    pub fn query(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Query {
            message: message.into(),
            sql_state,
            hint: None,
        }
    }

    /// Failure of an RPC on an open HiveServer2 session. A transport error
    /// means the server went away, anything else belongs to the statement.
    pub fn rpc(target: &str, err: thrift::Error) -> Self {
        match err {
            thrift::Error::Transport(e) => {
                Self::connection(target, format!("connection lost: {}", e.message))
            }
            other => Self::query(other.to_string(), None),
        }
    }

    pub fn remediation(&self) -> Option<Remediation> {
        match self {
            Self::Connection { remediation, .. } => *remediation,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_carries_ssl_hint() {
        let err = InfrastructureError::connection(
            "jdbc:hive2://h:10001",
            "javax.net.ssl.SSLHandshakeException: PKIX path building failed",
        );
        assert_eq!(err.remediation(), Some(Remediation::Certificate));
        let help = err.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("truststore_path"));
    }

    #[test]
    fn test_plain_connection_error_has_no_hint() {
        let err = InfrastructureError::connection("h:10000/d", "Connection refused");
        assert_eq!(err.remediation(), None);
        assert!(err.help().is_none());
        assert!(err.to_string().contains("h:10000/d"));
    }

    #[test]
    fn test_query_errors_never_carry_hints() {
        let err = InfrastructureError::query(
            "Error while compiling statement: Table not found 'ssl_events'",
            Some("42S02".into()),
        );
        assert_eq!(err.remediation(), None);
        assert!(err.help().is_none());
    }

    #[test]
    fn test_transport_failure_on_session_is_a_connection_error() {
        let eof = thrift::Error::Transport(thrift::TransportError::new(
            thrift::TransportErrorKind::EndOfFile,
            "failed to fill whole buffer",
        ));
        match InfrastructureError::rpc("h:10000/d", eof) {
            InfrastructureError::Connection { target, message, .. } => {
                assert_eq!(target, "h:10000/d");
                assert!(message.contains("connection lost"));
            }
            other => panic!("expected a connection error, got {:?}", other),
        }
    }

    #[test]
    fn test_protocol_failure_on_session_is_a_query_error() {
        let bad = thrift::Error::Protocol(thrift::ProtocolError::new(
            thrift::ProtocolErrorKind::InvalidData,
            "bad field",
        ));
        assert!(matches!(
            InfrastructureError::rpc("h:10000/d", bad),
            InfrastructureError::Query { .. }
        ));
    }
}
