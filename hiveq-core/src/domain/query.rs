// hiveq-core/src/domain/query.rs

use std::path::{Path, PathBuf};

use crate::domain::profile::HiveProfile;

/// Where the SQL text comes from, after priority resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySource {
    File(PathBuf),
    Inline(String),
    Interactive,
}

impl QuerySource {
    pub fn query_file(&self) -> Option<&Path> {
        match self {
            QuerySource::File(path) => Some(path),
            _ => None,
        }
    }
}

/// CLI file > CLI inline > config `query_file` > config `query` > stdin.
///
/// Config-relative `query_file` values are anchored at the config file's
/// directory; CLI paths are taken as given.
pub fn select_query_source(
    cli_file: Option<&Path>,
    cli_inline: Option<&str>,
    profile: &HiveProfile,
) -> QuerySource {
    if let Some(path) = cli_file {
        return QuerySource::File(path.to_path_buf());
    }
    if let Some(sql) = non_blank(cli_inline) {
        return QuerySource::Inline(sql);
    }
    if let Some(path) = &profile.query_file {
        return QuerySource::File(anchor(profile.config_dir(), path));
    }
    if let Some(sql) = non_blank(profile.query.as_deref()) {
        return QuerySource::Inline(sql);
    }
    QuerySource::Interactive
}

fn non_blank(sql: Option<&str>) -> Option<String> {
    sql.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn anchor(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
