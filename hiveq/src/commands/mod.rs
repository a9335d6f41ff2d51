// hiveq/src/commands/mod.rs

pub mod download;
pub mod export;
