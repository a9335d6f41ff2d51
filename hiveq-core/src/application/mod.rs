// hiveq-core/src/application/mod.rs

pub mod engine;
pub mod export;
pub mod query;

// --- RE-EXPORTS ---
// Lets the CLI write `use hiveq_core::application::{run_export, ExportRequest};`

pub use engine::execute_query;
pub use export::{ExportOutcome, ExportRequest, QueryInput, run_export, summary};
pub use query::read_query;
