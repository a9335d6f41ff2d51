// hiveq-core/src/infrastructure/csv_export.rs

use std::path::Path;
use tracing::{info, instrument};

use crate::domain::result_set::ResultSet;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write_with;

/// Writes the header (when the driver reported column names) and every row.
/// The target only appears once the whole file is on disk.
#[instrument(skip(result), fields(path = %path.display(), rows = result.row_count()))]
pub fn write_csv(path: &Path, result: &ResultSet) -> Result<(), InfrastructureError> {
    atomic_write_with(path, |file| {
        let mut writer = csv::Writer::from_writer(file);
        if !result.columns.is_empty() {
            writer.write_record(&result.columns)?;
        }
        for row in &result.rows {
            writer.write_record(row.iter().map(|value| value.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    })?;
    info!("CSV written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result_set::Value;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_header_and_rows() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("output.csv");
        let result = ResultSet::new(vec!["_c0".into()], vec![vec![Value::Int(1)]]);

        write_csv(&path, &result)?;

        assert_eq!(fs::read_to_string(&path)?, "_c0\n1\n");
        Ok(())
    }

    #[test]
    fn test_quoting_and_nulls() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("q.csv");
        let result = ResultSet::new(
            vec!["id".into(), "note".into(), "missing".into()],
            vec![vec![
                Value::Int(7),
                Value::from("say \"hi\", then leave"),
                Value::Null,
            ]],
        );

        write_csv(&path, &result)?;

        assert_eq!(
            fs::read_to_string(&path)?,
            "id,note,missing\n7,\"say \"\"hi\"\", then leave\",\n"
        );
        Ok(())
    }

    #[test]
    fn test_no_header_without_columns() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("q.csv");
        let result = ResultSet::new(vec![], vec![vec![Value::from("a"), Value::from("b")]]);

        write_csv(&path, &result)?;

        assert_eq!(fs::read_to_string(&path)?, "a,b\n");
        Ok(())
    }

    #[test]
    fn test_read_back_matches() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/out.csv");
        let result = ResultSet::new(
            vec!["name".into(), "score".into()],
            vec![
                vec![Value::from("ann, jr"), Value::Double(9.5)],
                vec![Value::from("line\nbreak"), Value::Int(-3)],
            ],
        );

        write_csv(&path, &result)?;

        let mut reader = csv::Reader::from_path(&path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        assert_eq!(headers, result.columns);
        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()))
            .collect::<Result<_, _>>()?;
        let expected: Vec<Vec<String>> = result
            .rows
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();
        assert_eq!(rows, expected);
        Ok(())
    }
}
