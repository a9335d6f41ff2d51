pub mod error;
pub mod output;
pub mod profile;
pub mod query;
pub mod remediation;
pub mod result_set;

// Handy re-exports to keep imports short elsewhere
pub use error::DomainError;
pub use profile::{ConnectionMode, ConnectionSettings, HiveProfile};
pub use remediation::Remediation;
pub use result_set::{ResultSet, Value};
