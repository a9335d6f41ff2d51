// hiveq/src/commands/export.rs
//
// USE CASE: run one query and write its rows to CSV.

use std::io::{IsTerminal, Write};

use hiveq_core::HiveqError;
use hiveq_core::application::{ExportOutcome, ExportRequest, QueryInput, run_export};
use hiveq_core::infrastructure::adapters::connect;

/// Runs the export against the real drivers, reading SQL from stdin when
/// neither the flags nor the profile name one.
pub fn execute(request: &ExportRequest) -> Result<ExportOutcome, HiveqError> {
    let stdin = std::io::stdin();
    let mut stderr = std::io::stderr();
    let prompt: Option<&mut dyn Write> = if stdin.is_terminal() {
        Some(&mut stderr)
    } else {
        None
    };

    let input = QueryInput {
        reader: stdin.lock(),
        prompt,
    };
    run_export(request, input, connect)
}
