// hiveq/src/cli.rs
//
// Single source of truth for the CLI definitions (Clap structs).

use clap::Parser;
use std::path::PathBuf;

use hiveq_core::application::ExportRequest;

#[derive(Parser, Debug)]
#[command(name = "hiveq")]
#[command(about = "Run a Hive query (Thrift or JDBC) and export the result to CSV", long_about = None)]
#[command(version)]
pub struct Cli {
    /// YAML configuration file (flat or tagged)
    #[arg(long, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Profile (top-level section) to use from a tagged config
    #[arg(long, short)]
    pub tag: Option<String>,

    /// Inline SQL to run
    #[arg(long, conflicts_with = "query_file")]
    pub query: Option<String>,

    /// File containing the SQL to run
    #[arg(long = "query-file", short = 'f', visible_alias = "file")]
    pub query_file: Option<PathBuf>,

    /// CSV destination (default: config `output`, `<query file>.csv` or output.csv)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn export_request(&self) -> ExportRequest {
        ExportRequest {
            config: self.config.clone(),
            tag: self.tag.clone(),
            query: self.query.clone(),
            query_file: self.query_file.clone(),
            output: self.output.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};

    #[test]
    fn test_cli_defaults() -> Result<()> {
        let cli = Cli::try_parse_from(["hiveq"])?;
        assert_eq!(cli.config, PathBuf::from("config.yaml"));
        assert_eq!(cli.tag, None);
        assert_eq!(cli.query, None);
        assert_eq!(cli.query_file, None);
        assert_eq!(cli.output, None);
        assert_eq!(cli.log_level, "info");
        Ok(())
    }

    #[test]
    fn test_cli_short_flags() -> Result<()> {
        let cli = Cli::try_parse_from([
            "hiveq", "-t", "InputQuery1", "-f", "q.sql", "-o", "out.csv",
        ])?;
        assert_eq!(cli.tag.as_deref(), Some("InputQuery1"));
        assert_eq!(cli.query_file, Some(PathBuf::from("q.sql")));
        assert_eq!(cli.output, Some(PathBuf::from("out.csv")));
        Ok(())
    }

    #[test]
    fn test_file_alias() -> Result<()> {
        let cli = Cli::try_parse_from(["hiveq", "--file", "report.sql"])?;
        assert_eq!(cli.query_file, Some(PathBuf::from("report.sql")));
        Ok(())
    }

    #[test]
    fn test_query_conflicts_with_query_file() -> Result<()> {
        match Cli::try_parse_from(["hiveq", "--query", "SELECT 1", "--query-file", "q.sql"]) {
            Err(e) => {
                assert_eq!(e.kind(), clap::error::ErrorKind::ArgumentConflict);
                Ok(())
            }
            Ok(_) => bail!("--query and --query-file must conflict"),
        }
    }

    #[test]
    fn test_export_request_mirrors_flags() -> Result<()> {
        let cli = Cli::try_parse_from(["hiveq", "--config", "conf/hive.yaml", "--query", "SELECT 1"])?;
        let request = cli.export_request();
        assert_eq!(request.config, PathBuf::from("conf/hive.yaml"));
        assert_eq!(request.query.as_deref(), Some("SELECT 1"));
        assert_eq!(request.query_file, None);
        Ok(())
    }
}
