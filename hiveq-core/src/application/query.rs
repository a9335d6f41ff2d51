// hiveq-core/src/application/query.rs

use std::fs;
use std::io::{self, Read, Write};
use tracing::{debug, info};

use crate::domain::error::DomainError;
use crate::domain::query::QuerySource;
use crate::error::HiveqError;

pub const PROMPT: &str = "Enter your Hive SQL query (finish with Ctrl-D):";

/// Turns a resolved source into SQL text. Files and stdin are trimmed;
/// `prompt` is written only when reading interactively.
pub fn read_query<R: Read>(
    source: &QuerySource,
    stdin: &mut R,
    prompt: Option<&mut dyn Write>,
) -> Result<String, HiveqError> {
    match source {
        QuerySource::Inline(sql) => Ok(sql.clone()),
        QuerySource::File(path) => {
            let label = path.display().to_string();
            let content = match fs::read_to_string(path) {
                Ok(c) => c,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(DomainError::QueryFileNotFound(label).into());
                }
                Err(e) => return Err(e.into()),
            };
            let sql = content.trim();
            if sql.is_empty() {
                return Err(DomainError::EmptyQueryFile(label).into());
            }
            info!(file = %label, "Query read from file");
            Ok(sql.to_string())
        }
        QuerySource::Interactive => {
            if let Some(out) = prompt {
                writeln!(out, "{}", PROMPT)?;
                out.flush()?;
            }
            let mut buffer = String::new();
            stdin.read_to_string(&mut buffer)?;
            let sql = buffer.trim();
            if sql.is_empty() {
                return Err(DomainError::NoQuery.into());
            }
            debug!(len = sql.len(), "Query read from stdin");
            Ok(sql.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn test_inline_passes_through() -> Result<()> {
        let sql = read_query(
            &QuerySource::Inline("SELECT 1".into()),
            &mut Cursor::new(""),
            None,
        )?;
        assert_eq!(sql, "SELECT 1");
        Ok(())
    }

    #[test]
    fn test_file_is_trimmed() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("q.sql");
        fs::write(&path, "\n  SELECT * FROM t;\n\n")?;

        let sql = read_query(&QuerySource::File(path), &mut Cursor::new(""), None)?;
        assert_eq!(sql, "SELECT * FROM t;");
        Ok(())
    }

    #[test]
    fn test_missing_and_empty_files() -> Result<()> {
        let dir = tempdir()?;
        let missing = dir.path().join("absent.sql");
        assert!(matches!(
            read_query(&QuerySource::File(missing), &mut Cursor::new(""), None),
            Err(HiveqError::Domain(DomainError::QueryFileNotFound(_)))
        ));

        let empty = dir.path().join("empty.sql");
        fs::write(&empty, "  \n\t")?;
        assert!(matches!(
            read_query(&QuerySource::File(empty), &mut Cursor::new(""), None),
            Err(HiveqError::Domain(DomainError::EmptyQueryFile(_)))
        ));
        Ok(())
    }

    #[test]
    fn test_interactive_reads_stdin_and_prompts() -> Result<()> {
        let mut prompt = Vec::new();
        let sql = read_query(
            &QuerySource::Interactive,
            &mut Cursor::new("SELECT\n  2\n"),
            Some(&mut prompt as &mut dyn Write),
        )?;
        assert_eq!(sql, "SELECT\n  2");
        assert!(String::from_utf8(prompt)?.starts_with(PROMPT));
        Ok(())
    }

    #[test]
    fn test_empty_stdin_is_no_query() {
        assert!(matches!(
            read_query(&QuerySource::Interactive, &mut Cursor::new("   \n"), None),
            Err(HiveqError::Domain(DomainError::NoQuery))
        ));
    }
}
