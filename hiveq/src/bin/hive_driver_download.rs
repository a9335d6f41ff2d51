// hiveq/src/bin/hive_driver_download.rs
//
// Interactive helper: downloads the standalone Hive JDBC driver into ./drivers.

use std::io::{self, BufReader};
use std::path::Path;
use std::process::ExitCode;
use tracing::error;

use hiveq::commands::download;
use hiveq::logging::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging("warn");

    // Ctrl-C at a prompt exits here; a running transfer cancels itself
    // so its temp file is dropped first.
    tokio::spawn(async {
        while tokio::signal::ctrl_c().await.is_ok() {
            if !download::transfer_running() {
                println!("\nCancelled.");
                std::process::exit(0);
            }
        }
    });

    let mut input = BufReader::new(io::stdin());
    let mut out = io::stdout();
    match download::run(&mut input, &mut out, Path::new(".")).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
