// hiveq-core/src/infrastructure/config/loader.rs

use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::domain::error::DomainError;
use crate::domain::profile::{HiveProfile, ProfileConfig};
use crate::error::HiveqError;
use crate::infrastructure::error::InfrastructureError;

/// Top-level keys that mark a flat (untagged) config.
const PROFILE_KEYS: [&str; 11] = [
    "mode",
    "host",
    "port",
    "username",
    "database",
    "auth",
    "hive_jdbc_url",
    "hive_driver_class",
    "query",
    "query_file",
    "output",
];

pub const PASSWORD_ENV: &str = "HIVEQ_PASSWORD";

// --- LOADER ---

/// Loads one profile from a YAML file, selecting `tag` when given.
///
/// Key presence is checked before anything touches the network, so a
/// half-written profile fails here with every missing key listed.
#[instrument(skip(config_path), fields(path = %config_path.display()))]
pub fn load_profile(config_path: &Path, tag: Option<&str>) -> Result<HiveProfile, HiveqError> {
    if !config_path.exists() {
        return Err(InfrastructureError::ConfigNotFound(config_path.display().to_string()).into());
    }

    info!("Loading Hive configuration");
    let content = fs::read_to_string(config_path).map_err(InfrastructureError::Io)?;
    let document: Value = if content.trim().is_empty() {
        Value::Mapping(Mapping::new())
    } else {
        serde_yaml::from_str(&content).map_err(InfrastructureError::YamlError)?
    };

    let path_label = config_path.display().to_string();
    let section = select_section(document, tag, &path_label)?;

    let mut raw: ProfileConfig =
        serde_yaml::from_value(section).map_err(InfrastructureError::YamlError)?;
    apply_env_overrides(&mut raw, |key| std::env::var(key).ok());

    let profile = raw.into_profile(config_path, tag)?;
    debug!(
        mode = %profile.connection.mode(),
        target = %profile.connection.target(),
        "Profile resolved"
    );
    Ok(profile)
}

/// Picks the mapping the profile lives in: the tag's table, or the whole
/// document for flat configs.
fn select_section(
    document: Value,
    tag: Option<&str>,
    path: &str,
) -> Result<Value, DomainError> {
    let root = match document {
        Value::Mapping(map) => map,
        Value::Null => Mapping::new(),
        _ => {
            return Err(DomainError::InvalidConfig(format!(
                "{} must contain a mapping at the top level",
                path
            )));
        }
    };

    match tag {
        Some(tag) => match root.get(tag) {
            Some(Value::Mapping(section)) => Ok(Value::Mapping(section.clone())),
            Some(_) => Err(DomainError::InvalidTagSection {
                tag: tag.to_string(),
                path: path.to_string(),
            }),
            None => Err(DomainError::UnknownTag {
                tag: tag.to_string(),
                path: path.to_string(),
                available: tag_names(&root),
            }),
        },
        None => {
            let has_profile_keys = root
                .keys()
                .filter_map(Value::as_str)
                .any(|k| PROFILE_KEYS.contains(&k));
            let tags = tag_names(&root);
            if !has_profile_keys && !tags.is_empty() {
                return Err(DomainError::TagRequired {
                    path: path.to_string(),
                    available: tags,
                });
            }
            Ok(Value::Mapping(root))
        }
    }
}

/// Top-level keys whose value is a table, in file order.
fn tag_names(root: &Mapping) -> Vec<String> {
    root.iter()
        .filter(|(_, v)| v.is_mapping())
        .filter_map(|(k, _)| k.as_str().map(str::to_string))
        .collect()
}

/// Lets the password live outside the file: `HIVEQ_PASSWORD=... hiveq -t Q1`.
fn apply_env_overrides<F>(raw: &mut ProfileConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(password) = lookup(PASSWORD_ENV) {
        info!("Using password from {}", PASSWORD_ENV);
        raw.password = Some(password);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::ConnectionSettings;
    use anyhow::{Result, bail};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(content.as_bytes())?;
        Ok(file)
    }

    const TAGGED: &str = r#"
InputQuery1:
  host: hive-a
  port: 10000
  username: alice
  database: sales
  auth: NONE
  query: SELECT 1
InputQuery2:
  hive_jdbc_url: "jdbc:hive2://hive-b:10001/default;ssl=true"
  hive_driver_class: org.apache.hive.jdbc.HiveDriver
  username: bob
  password: secret
  query_file: report.sql
"#;

    #[test]
    fn test_load_flat_config() -> Result<()> {
        let file = write_config(
            "host: h\nport: 10000\nusername: u\ndatabase: d\nauth: NONE\nquery: SELECT 1\n",
        )?;
        let profile = load_profile(file.path(), None)?;
        assert_eq!(profile.query.as_deref(), Some("SELECT 1"));
        assert!(matches!(profile.connection, ConnectionSettings::Thrift(_)));
        Ok(())
    }

    #[test]
    fn test_load_tagged_config() -> Result<()> {
        let file = write_config(TAGGED)?;

        let first = load_profile(file.path(), Some("InputQuery1"))?;
        assert_eq!(first.connection.target(), "hive-a:10000/sales");

        let second = load_profile(file.path(), Some("InputQuery2"))?;
        let ConnectionSettings::Jdbc(jdbc) = second.connection else {
            bail!("expected JDBC profile");
        };
        assert_eq!(jdbc.driver_class, "org.apache.hive.jdbc.HiveDriver");
        assert_eq!(second.query_file, Some("report.sql".into()));
        Ok(())
    }

    #[test]
    fn test_unknown_tag_lists_available_tags() -> Result<()> {
        let file = write_config(TAGGED)?;
        match load_profile(file.path(), Some("Nope")) {
            Err(HiveqError::Domain(DomainError::UnknownTag { available, .. })) => {
                assert_eq!(available, vec!["InputQuery1", "InputQuery2"]);
            }
            other => bail!("expected UnknownTag, got {:?}", other),
        }
        let err = load_profile(file.path(), Some("Nope"))
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(err.contains("InputQuery1, InputQuery2"));
        Ok(())
    }

    #[test]
    fn test_tag_pointing_at_scalar_is_rejected() -> Result<()> {
        let file = write_config("Broken: 42\nOther:\n  host: h\n")?;
        assert!(matches!(
            load_profile(file.path(), Some("Broken")),
            Err(HiveqError::Domain(DomainError::InvalidTagSection { .. }))
        ));
        Ok(())
    }

    #[test]
    fn test_tagged_config_without_tag_asks_for_one() -> Result<()> {
        let file = write_config(TAGGED)?;
        assert!(matches!(
            load_profile(file.path(), None),
            Err(HiveqError::Domain(DomainError::TagRequired { .. }))
        ));
        Ok(())
    }

    #[test]
    fn test_missing_keys_are_reported_together() -> Result<()> {
        let file = write_config("host: h\n")?;
        let err = load_profile(file.path(), None)
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        for key in ["port", "username", "database", "auth"] {
            assert!(err.contains(key), "'{}' missing from: {}", key, err);
        }
        Ok(())
    }

    #[test]
    fn test_empty_file_reports_missing_keys() -> Result<()> {
        let file = write_config("")?;
        assert!(matches!(
            load_profile(file.path(), None),
            Err(HiveqError::Domain(DomainError::MissingKeys { .. }))
        ));
        Ok(())
    }

    #[test]
    fn test_missing_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("absent.yaml");
        assert!(matches!(
            load_profile(&path, None),
            Err(HiveqError::Infrastructure(InfrastructureError::ConfigNotFound(_)))
        ));
        Ok(())
    }

    #[test]
    fn test_env_password_override() {
        let mut raw = ProfileConfig {
            password: Some("from-file".into()),
            ..Default::default()
        };
        apply_env_overrides(&mut raw, |k| {
            (k == PASSWORD_ENV).then(|| "from-env".to_string())
        });
        assert_eq!(raw.password.as_deref(), Some("from-env"));

        let mut raw = ProfileConfig::default();
        apply_env_overrides(&mut raw, |_| None);
        assert_eq!(raw.password, None);
    }
}
