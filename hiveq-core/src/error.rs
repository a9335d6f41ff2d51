// hiveq-core/src/error.rs

use crate::domain::error::DomainError;
use crate::domain::remediation::Remediation;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum HiveqError {
    // --- DOMAIN ERRORS (config keys, tags, query source) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (drivers, IO, parsing) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC / APPLICATION ERRORS ---
    #[error("Internal Error: {0}")]
    InternalError(String),
}

/// Coarse error class the CLI reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    QuerySource,
    Connection,
    Query,
    Io,
}

impl HiveqError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HiveqError::Domain(e) => match e {
                DomainError::QueryFileNotFound(_)
                | DomainError::EmptyQueryFile(_)
                | DomainError::NoQuery => ErrorKind::QuerySource,
                _ => ErrorKind::Config,
            },
            HiveqError::Infrastructure(e) => match e {
                InfrastructureError::Connection { .. } => ErrorKind::Connection,
                InfrastructureError::Query { .. } => ErrorKind::Query,
                InfrastructureError::YamlError(_) | InfrastructureError::ConfigNotFound(_) => {
                    ErrorKind::Config
                }
                InfrastructureError::Io(_)
                | InfrastructureError::Csv(_)
                | InfrastructureError::Download { .. } => ErrorKind::Io,
            },
            HiveqError::InternalError(_) => ErrorKind::Io,
        }
    }

    pub fn remediation(&self) -> Option<Remediation> {
        match self {
            HiveqError::Infrastructure(e) => e.remediation(),
            _ => None,
        }
    }
}

// Manual implementation to avoid duplicate enum variant but keep ergonomics
impl From<std::io::Error> for HiveqError {
    fn from(err: std::io::Error) -> Self {
        HiveqError::Infrastructure(InfrastructureError::Io(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let err: HiveqError = DomainError::NoQuery.into();
        assert_eq!(err.kind(), ErrorKind::QuerySource);

        let err: HiveqError = DomainError::MissingKeys {
            path: "config.yaml".into(),
            keys: vec!["host".into()],
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Config);

        let err: HiveqError = InfrastructureError::connection("h", "boom").into();
        assert_eq!(err.kind(), ErrorKind::Connection);

        let err: HiveqError = std::io::Error::other("disk full").into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_remediation_surfaces_through_wrapper() {
        let err: HiveqError =
            InfrastructureError::connection("jdbc:hive2://h", "No Java runtime present").into();
        assert_eq!(err.remediation(), Some(Remediation::JavaRuntime));
    }
}
