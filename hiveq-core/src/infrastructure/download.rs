// hiveq-core/src/infrastructure/download.rs
//
// Fetches the standalone Hive JDBC driver jar from Maven Central.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::parent_dir;

pub const DEFAULT_DRIVER_VERSION: &str = "3.1.2";
pub const DRIVER_DIR: &str = "drivers";

const MAVEN_BASE: &str = "https://repo1.maven.org/maven2/org/apache/hive/hive-jdbc";

pub fn driver_file_name(version: &str) -> String {
    format!("hive-jdbc-{}-standalone.jar", version)
}

pub fn driver_url(version: &str) -> String {
    format!("{}/{}/{}", MAVEN_BASE, version, driver_file_name(version))
}

/// `drivers/hive-jdbc-<v>-standalone.jar` under `base`.
pub fn driver_destination(base: &Path, version: &str) -> PathBuf {
    base.join(DRIVER_DIR).join(driver_file_name(version))
}

/// Streams `url` into `dest`, calling `progress(downloaded, total)` after
/// each chunk. The jar only appears at `dest` once fully received.
#[instrument(skip(progress), fields(dest = %dest.display()))]
pub async fn download_file<F>(url: &str, dest: &Path, mut progress: F) -> Result<u64, InfrastructureError>
where
    F: FnMut(u64, Option<u64>),
{
    let start = Instant::now();
    let failed = |message: String| InfrastructureError::Download {
        url: url.to_string(),
        message,
    };

    let mut response = reqwest::get(url).await.map_err(|e| failed(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(failed(format!("HTTP {}", status)));
    }
    let total = response.content_length();
    debug!(?total, "Download started");

    let parent = parent_dir(dest);
    std::fs::create_dir_all(parent)?;
    let mut temp = tempfile::NamedTempFile::new_in(parent)?;

    let mut downloaded = 0u64;
    while let Some(chunk) = response.chunk().await.map_err(|e| failed(e.to_string()))? {
        temp.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        progress(downloaded, total);
    }
    temp.as_file().sync_all()?;
    temp.persist(dest).map_err(|e| InfrastructureError::Io(e.error))?;

    info!(
        bytes = downloaded,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Driver downloaded"
    );
    Ok(downloaded)
}

/// [`download_file`] raced against `cancel`. `Ok(None)` when `cancel`
/// wins; dropping the transfer removes the partial temp file.
pub async fn download_or_cancel<F, C>(
    url: &str,
    dest: &Path,
    progress: F,
    cancel: C,
) -> Result<Option<u64>, InfrastructureError>
where
    F: FnMut(u64, Option<u64>),
    C: Future<Output = ()>,
{
    tokio::select! {
        result = download_file(url, dest, progress) => result.map(Some),
        () = cancel => {
            info!("Download cancelled");
            Ok(None)
        }
    }
}

/// Whole percent, `None` when the server sent no length.
pub fn percent(downloaded: u64, total: Option<u64>) -> Option<u64> {
    match total {
        Some(t) if t > 0 => Some((downloaded.saturating_mul(100) / t).min(100)),
        _ => None,
    }
}
