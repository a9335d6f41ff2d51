use crate::infrastructure::error::InfrastructureError;
use std::fs::File;
use std::path::Path;

/// Directory a file lives in; `"."` for bare file names.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Write a file atomically through a temporary sibling file.
///
/// This function:
/// 1. Creates the parent directory (and ancestors) if needed.
/// 2. Lets `fill` write into a temporary file in that directory.
/// 3. Persists (renames) the temporary file to the target path.
///
/// If `fill` fails the temporary file is dropped and the target is left
/// untouched.
pub fn atomic_write_with<P, F>(path: P, fill: F) -> Result<(), InfrastructureError>
where
    P: AsRef<Path>,
    F: FnOnce(&mut File) -> Result<(), InfrastructureError>,
{
    let path = path.as_ref();
    let parent = parent_dir(path);
    std::fs::create_dir_all(parent).map_err(InfrastructureError::Io)?;

    // Same directory so the rename never crosses filesystems
    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(InfrastructureError::Io)?;

    fill(temp_file.as_file_mut())?;
    temp_file.as_file().sync_all().map_err(InfrastructureError::Io)?;

    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_creates_missing_dirs() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("nested/deeper/test.txt");

        atomic_write_with(&file_path, |f| {
            f.write_all(b"Hello, World!").map_err(InfrastructureError::Io)
        })?;

        assert_eq!(fs::read_to_string(file_path)?, "Hello, World!");
        Ok(())
    }

    #[test]
    fn test_failed_fill_leaves_target_untouched() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("test.txt");
        fs::write(&file_path, "Initial")?;

        let result = atomic_write_with(&file_path, |f| {
            f.write_all(b"partial").map_err(InfrastructureError::Io)?;
            Err(InfrastructureError::Io(std::io::Error::other("driver hiccup")))
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&file_path)?, "Initial");
        // no stray temp files either
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_parent_dir_of_bare_name() {
        assert_eq!(parent_dir(Path::new("output.csv")), Path::new("."));
        assert_eq!(parent_dir(Path::new("out/x.csv")), Path::new("out"));
    }
}
