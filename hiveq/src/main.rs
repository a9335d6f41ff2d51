// hiveq/src/main.rs

use clap::Parser;
use std::process::ExitCode;
use tracing::error;

use hiveq::cli::Cli;
use hiveq::commands::export;
use hiveq::logging::init_logging;
use hiveq_core::application::summary;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // 1. Setup Logging (Tracing)
    // RUST_LOG=hiveq_core=debug hiveq -t InputQuery1 to see driver details
    init_logging(&cli.log_level);

    match export::execute(&cli.export_request()) {
        Ok(outcome) => {
            println!("{}", summary(&outcome));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(kind = ?e.kind(), "{}", e);
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::FAILURE
        }
    }
}
