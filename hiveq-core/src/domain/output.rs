// hiveq-core/src/domain/output.rs

use std::path::{Path, PathBuf};

use crate::domain::profile::HiveProfile;
use crate::domain::query::{QuerySource, anchor};

pub const DEFAULT_OUTPUT: &str = "output.csv";

/// Flag > config `output` > `<query file>.csv` > `output.csv`.
pub fn resolve_output_path(
    explicit: Option<&Path>,
    profile: &HiveProfile,
    source: &QuerySource,
) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(path) = &profile.output {
        return anchor(profile.config_dir(), path);
    }
    if let Some(query_file) = source.query_file() {
        return query_file.with_extension("csv");
    }
    PathBuf::from(DEFAULT_OUTPUT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::tests::profile;

    #[test]
    fn test_explicit_flag_wins() {
        let mut p = profile("conf/config.yaml");
        p.output = Some("from_config.csv".into());
        let out = resolve_output_path(
            Some(Path::new("flag.csv")),
            &p,
            &QuerySource::File("q.sql".into()),
        );
        assert_eq!(out, PathBuf::from("flag.csv"));
    }

    #[test]
    fn test_config_output_relative_to_config_dir() {
        let mut p = profile("conf/config.yaml");
        p.output = Some("out/result.csv".into());
        let out = resolve_output_path(None, &p, &QuerySource::Interactive);
        assert_eq!(out, PathBuf::from("conf/out/result.csv"));

        p.output = Some("/tmp/abs.csv".into());
        let out = resolve_output_path(None, &p, &QuerySource::Interactive);
        assert_eq!(out, PathBuf::from("/tmp/abs.csv"));
    }

    #[test]
    fn test_derived_from_query_file() {
        let p = profile("config.yaml");
        let out = resolve_output_path(
            None,
            &p,
            &QuerySource::File("queries/report.sql".into()),
        );
        assert_eq!(out, PathBuf::from("queries/report.csv"));
    }

    #[test]
    fn test_default_when_nothing_else() {
        let p = profile("config.yaml");
        let out = resolve_output_path(None, &p, &QuerySource::Inline("SELECT 1".into()));
        assert_eq!(out, PathBuf::from(DEFAULT_OUTPUT));
    }
}
