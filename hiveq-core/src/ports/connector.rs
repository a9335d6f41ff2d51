// hiveq-core/src/ports/connector.rs

// What the application needs from a Hive driver, without knowing whether the
// bytes travel over Thrift or through a JVM.

use crate::domain::result_set::ResultSet;
use crate::error::HiveqError;

pub trait Connector {
    /// Runs one statement and eagerly fetches every row plus the column names.
    fn fetch_all(&mut self, query: &str) -> Result<ResultSet, HiveqError>;

    /// Releases the server-side session. Must be idempotent: adapters also
    /// call it from `Drop`.
    fn close(&mut self) -> Result<(), HiveqError>;

    fn engine_name(&self) -> &str;
}
