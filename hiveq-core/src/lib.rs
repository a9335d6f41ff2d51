// hiveq-core/src/lib.rs

#![allow(missing_docs)]
// 1. Memory safety
#![deny(unsafe_code)]
// 2. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 3. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// The contract every Hive driver adapter fulfils.
pub mod ports;

// 2. Domain
// Profiles, result sets, resolution rules. Depends on nothing else.
pub mod domain;

// 3. Infrastructure (Adapters)
// YAML config, Thrift / JDBC drivers, CSV, downloads.
pub mod infrastructure;

// 4. Application (Use Cases)
// Orchestration of one export run.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::{ErrorKind, HiveqError};
