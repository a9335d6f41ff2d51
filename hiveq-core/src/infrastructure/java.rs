// hiveq-core/src/infrastructure/java.rs

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, instrument};

use crate::domain::remediation::Remediation;
use crate::infrastructure::error::InfrastructureError;

/// `$JAVA_HOME/bin/java` when JAVA_HOME is set, else `java` from PATH.
pub fn java_binary(java_home: Option<OsString>) -> PathBuf {
    match java_home {
        Some(home) if !home.is_empty() => PathBuf::from(home).join("bin").join("java"),
        _ => PathBuf::from("java"),
    }
}

/// Runs `java -version` and returns the first line it printed.
#[instrument(skip(target))]
pub fn check_java_runtime(target: &str) -> Result<String, InfrastructureError> {
    let binary = java_binary(std::env::var_os("JAVA_HOME"));
    let missing = |detail: String| {
        InfrastructureError::connection_with(
            target,
            format!("Java runtime not available ({}): {}", binary.display(), detail),
            Remediation::JavaRuntime,
        )
    };

    let output = Command::new(&binary)
        .arg("-version")
        .output()
        .map_err(|e| missing(e.to_string()))?;
    if !output.status.success() {
        return Err(missing(format!("exited with {}", output.status)));
    }

    // `java -version` reports on stderr
    let text = String::from_utf8_lossy(&output.stderr);
    let version = text
        .lines()
        .next()
        .unwrap_or("unknown version")
        .trim()
        .to_string();
    debug!(%version, "Java runtime found");
    Ok(version)
}
