// hiveq-core/src/application/export.rs

use std::io::{Read, Write};
use std::path::PathBuf;
use tracing::{info, instrument};

use crate::application::engine::execute_query;
use crate::application::query::read_query;
use crate::domain::output::resolve_output_path;
use crate::domain::profile::ConnectionSettings;
use crate::domain::query::select_query_source;
use crate::error::HiveqError;
use crate::infrastructure::config::load_profile;
use crate::infrastructure::csv_export::write_csv;
use crate::ports::connector::Connector;

/// Everything the command line can say about one export.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub config: PathBuf,
    pub tag: Option<String>,
    pub query: Option<String>,
    pub query_file: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub rows: usize,
    /// Where the CSV was (or would have been) written.
    pub path: PathBuf,
    /// False when the query returned no rows and nothing was written.
    pub written: bool,
}

/// Where interactive SQL comes from and where the prompt goes.
pub struct QueryInput<'a, R: Read> {
    pub reader: R,
    pub prompt: Option<&'a mut dyn Write>,
}

/// Load profile, resolve query and output, run, write CSV.
///
/// `connect` opens the driver for the profile; the CLI passes
/// [`crate::infrastructure::adapters::connect`].
#[instrument(skip_all, fields(config = %request.config.display(), tag = ?request.tag))]
pub fn run_export<R, C>(
    request: &ExportRequest,
    stdin: QueryInput<'_, R>,
    connect: C,
) -> Result<ExportOutcome, HiveqError>
where
    R: Read,
    C: FnOnce(&ConnectionSettings) -> Result<Box<dyn Connector>, HiveqError>,
{
    let profile = load_profile(&request.config, request.tag.as_deref())?;

    let source = select_query_source(
        request.query_file.as_deref(),
        request.query.as_deref(),
        &profile,
    );
    let QueryInput { mut reader, prompt } = stdin;
    let sql = read_query(&source, &mut reader, prompt)?;
    let path = resolve_output_path(request.output.as_deref(), &profile, &source);

    let connector = connect(&profile.connection)?;
    let result = execute_query(connector, &sql)?;

    if result.is_empty() {
        info!("Query returned no rows; nothing written");
        return Ok(ExportOutcome {
            rows: 0,
            path,
            written: false,
        });
    }

    write_csv(&path, &result)?;
    Ok(ExportOutcome {
        rows: result.row_count(),
        path,
        written: true,
    })
}

/// Line printed on success.
pub fn summary(outcome: &ExportOutcome) -> String {
    if outcome.written {
        format!(
            "Query executed successfully. Wrote {} rows to '{}'.",
            outcome.rows,
            outcome.path.display()
        )
    } else {
        "Query executed successfully. No rows returned.".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::engine::tests::FakeConnector;
    use crate::domain::error::DomainError;
    use crate::domain::result_set::{ResultSet, Value};
    use anyhow::{Result, bail};
    use std::fs;
    use std::io::{Cursor, empty};
    use std::path::Path;
    use tempfile::tempdir;

    const CONFIG: &str = "host: h\nport: 10000\nusername: u\ndatabase: d\nauth: NONE\n";

    fn request_for(config: &Path) -> ExportRequest {
        ExportRequest {
            config: config.to_path_buf(),
            ..Default::default()
        }
    }

    fn no_stdin() -> QueryInput<'static, std::io::Empty> {
        QueryInput {
            reader: empty(),
            prompt: None,
        }
    }

    #[test]
    fn test_export_writes_csv_next_to_query_file() -> Result<()> {
        let dir = tempdir()?;
        let config = dir.path().join("config.yaml");
        fs::write(&config, format!("{}query_file: report.sql\n", CONFIG))?;
        fs::write(dir.path().join("report.sql"), "SELECT 1\n")?;

        let (conn, log) =
            FakeConnector::returning(ResultSet::new(vec!["_c0".into()], vec![vec![Value::Int(1)]]));
        let outcome = run_export(&request_for(&config), no_stdin(), move |_| {
            Ok(Box::new(conn) as Box<dyn Connector>)
        })?;

        let expected = dir.path().join("report.csv");
        assert_eq!(outcome.path, expected);
        assert!(outcome.written);
        assert_eq!(fs::read_to_string(&expected)?, "_c0\n1\n");
        assert_eq!(
            summary(&outcome),
            format!(
                "Query executed successfully. Wrote 1 rows to '{}'.",
                expected.display()
            )
        );
        let log = log.lock().map_err(|_| anyhow::anyhow!("poisoned"))?;
        assert_eq!(*log, vec!["fetch:SELECT 1", "close"]);
        Ok(())
    }

    #[test]
    fn test_zero_rows_writes_nothing() -> Result<()> {
        let dir = tempdir()?;
        let config = dir.path().join("config.yaml");
        fs::write(&config, CONFIG)?;
        let out = dir.path().join("out.csv");

        let request = ExportRequest {
            query: Some("SELECT * FROM empty_table".into()),
            output: Some(out.clone()),
            ..request_for(&config)
        };
        let (conn, _log) = FakeConnector::returning(ResultSet::new(vec!["id".into()], vec![]));
        let outcome = run_export(&request, no_stdin(), move |_| {
            Ok(Box::new(conn) as Box<dyn Connector>)
        })?;

        assert!(!outcome.written);
        assert!(!out.exists());
        assert_eq!(
            summary(&outcome),
            "Query executed successfully. No rows returned."
        );
        Ok(())
    }

    #[test]
    fn test_stdin_query_used_when_nothing_configured() -> Result<()> {
        let dir = tempdir()?;
        let config = dir.path().join("config.yaml");
        fs::write(&config, CONFIG)?;
        let request = ExportRequest {
            output: Some(dir.path().join("x.csv")),
            ..request_for(&config)
        };

        let (conn, log) =
            FakeConnector::returning(ResultSet::new(vec!["n".into()], vec![vec![Value::Int(5)]]));
        let stdin = QueryInput {
            reader: Cursor::new("SELECT 5"),
            prompt: None,
        };
        run_export(&request, stdin, move |_| Ok(Box::new(conn) as Box<dyn Connector>))?;

        let log = log.lock().map_err(|_| anyhow::anyhow!("poisoned"))?;
        assert_eq!(log.first().map(String::as_str), Some("fetch:SELECT 5"));
        Ok(())
    }

    #[test]
    fn test_config_errors_stop_before_connecting() -> Result<()> {
        let dir = tempdir()?;
        let config = dir.path().join("config.yaml");
        fs::write(&config, "host: h\n")?;

        let result = run_export(&request_for(&config), no_stdin(), |_| {
            bail_connect()
        });
        match result {
            Err(HiveqError::Domain(DomainError::MissingKeys { .. })) => Ok(()),
            other => bail!("expected missing keys, got {:?}", other),
        }
    }

    fn bail_connect() -> Result<Box<dyn Connector>, HiveqError> {
        Err(HiveqError::InternalError("connect must not be called".into()))
    }
}
