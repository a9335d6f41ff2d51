// hiveq-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod config;
pub mod csv_export;
pub mod download;
pub mod error;
pub mod fs;
pub mod java;
