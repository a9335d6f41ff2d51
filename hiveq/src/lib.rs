// hiveq/src/lib.rs
//
// Shared pieces of the `hiveq` and `hive-driver-download` binaries.

pub mod cli;
pub mod commands;
pub mod logging;
