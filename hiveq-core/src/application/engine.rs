// hiveq-core/src/application/engine.rs

use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::result_set::ResultSet;
use crate::error::HiveqError;
use crate::ports::connector::Connector;

/// Runs one query with timing, then closes the connector whatever happened.
/// A failed close is logged and never replaces the query outcome.
#[instrument(skip(connector, query), fields(engine = connector.engine_name(), query.len = query.len()))]
pub fn execute_query(
    mut connector: Box<dyn Connector>,
    query: &str,
) -> Result<ResultSet, HiveqError> {
    let start = Instant::now();
    debug!("Executing query: {}", query);

    let result = connector.fetch_all(query);
    let duration = start.elapsed();

    match &result {
        Ok(rs) => info!(
            rows = rs.row_count(),
            columns = rs.columns.len(),
            "Query finished in {:.2?}",
            duration
        ),
        Err(e) => error!("Query failed after {:.2?}: {}", duration, e),
    }

    if let Err(e) = connector.close() {
        warn!(error = %e, "Failed to close connection");
    }

    result
}
