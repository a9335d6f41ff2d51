// hiveq-core/src/domain/profile.rs

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::domain::error::DomainError;

const DEFAULT_FETCH_SIZE: i64 = 10_000;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Which driver family a profile talks through.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    Thrift,
    Jdbc,
}

impl ConnectionMode {
    pub fn required_keys(self) -> &'static [&'static str] {
        match self {
            ConnectionMode::Thrift => &["host", "port", "username", "database", "auth"],
            ConnectionMode::Jdbc => &[
                "hive_jdbc_url",
                "hive_driver_class",
                "username",
                "password",
            ],
        }
    }
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionMode::Thrift => write!(f, "thrift"),
            ConnectionMode::Jdbc => write!(f, "jdbc"),
        }
    }
}

/// HiveServer2 authentication mechanism (`hive.server2.authentication`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThriftAuth {
    None,
    NoSasl,
    Ldap,
    Custom,
    Kerberos,
}

impl ThriftAuth {
    pub fn uses_sasl(self) -> bool {
        !matches!(self, ThriftAuth::NoSasl)
    }
}

impl FromStr for ThriftAuth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(ThriftAuth::None),
            "NOSASL" => Ok(ThriftAuth::NoSasl),
            "LDAP" => Ok(ThriftAuth::Ldap),
            "CUSTOM" => Ok(ThriftAuth::Custom),
            "KERBEROS" => Ok(ThriftAuth::Kerberos),
            other => Err(format!(
                "unknown auth '{}' (expected NONE, NOSASL, LDAP, CUSTOM or KERBEROS)",
                other
            )),
        }
    }
}

impl fmt::Display for ThriftAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ThriftAuth::None => "NONE",
            ThriftAuth::NoSasl => "NOSASL",
            ThriftAuth::Ldap => "LDAP",
            ThriftAuth::Custom => "CUSTOM",
            ThriftAuth::Kerberos => "KERBEROS",
        };
        f.write_str(name)
    }
}

// --- 1. RAW YAML SECTION (DTO) ---

/// One profile as written in YAML. Every key is optional here; presence is
/// checked per connection mode by [`ProfileConfig::missing_keys`].
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProfileConfig {
    pub mode: Option<ConnectionMode>,

    // Thrift
    pub host: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub port: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub database: Option<String>,
    pub auth: Option<String>,
    pub fetch_size: Option<i64>,
    pub connect_timeout_secs: Option<u64>,

    // JDBC
    pub hive_jdbc_url: Option<String>,
    pub hive_driver_class: Option<String>,
    pub hive_driver_jar: Option<PathBuf>,
    pub truststore_path: Option<PathBuf>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub truststore_password: Option<String>,
    pub truststore_type: Option<String>,
    pub keystore_path: Option<PathBuf>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub keystore_password: Option<String>,
    pub keystore_type: Option<String>,
    #[serde(default)]
    pub disable_ssl_verification: bool,
    pub check_java: Option<bool>,

    // Query / output
    pub query: Option<String>,
    pub query_file: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// YAML lets `port: 10000` and `password: 1234` through as numbers.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_yaml::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a scalar value, found {:?}",
            other
        ))),
    }
}

impl ProfileConfig {
    /// Explicit `mode` wins; otherwise a JDBC URL selects JDBC.
    pub fn connection_mode(&self) -> ConnectionMode {
        match self.mode {
            Some(mode) => mode,
            None if self.hive_jdbc_url.is_some() => ConnectionMode::Jdbc,
            None => ConnectionMode::Thrift,
        }
    }

    pub fn missing_keys(&self) -> Vec<String> {
        self.connection_mode()
            .required_keys()
            .iter()
            .filter(|key| !self.has_key(key))
            .map(|key| key.to_string())
            .collect()
    }

    fn has_key(&self, key: &str) -> bool {
        match key {
            "host" => self.host.is_some(),
            "port" => self.port.is_some(),
            "username" => self.username.is_some(),
            "password" => self.password.is_some(),
            "database" => self.database.is_some(),
            "auth" => self.auth.is_some(),
            "hive_jdbc_url" => self.hive_jdbc_url.is_some(),
            "hive_driver_class" => self.hive_driver_class.is_some(),
            _ => false,
        }
    }

    /// Checks key presence for the active mode, then builds and validates the
    /// typed profile.
    pub fn into_profile(
        self,
        config_path: &Path,
        tag: Option<&str>,
    ) -> Result<HiveProfile, DomainError> {
        let missing = self.missing_keys();
        if !missing.is_empty() {
            return Err(DomainError::MissingKeys {
                path: config_path.display().to_string(),
                keys: missing,
            });
        }

        let connection = match self.connection_mode() {
            ConnectionMode::Thrift => ConnectionSettings::Thrift(self.thrift_settings()?),
            ConnectionMode::Jdbc => ConnectionSettings::Jdbc(self.jdbc_settings()?),
        };

        Ok(HiveProfile {
            tag: tag.map(str::to_string),
            config_path: config_path.to_path_buf(),
            connection,
            query: self.query,
            query_file: self.query_file,
            output: self.output,
        })
    }

    fn thrift_settings(&self) -> Result<ThriftSettings, DomainError> {
        let port_text = self.port.clone().unwrap_or_default();
        let port = port_text.trim().parse::<u16>().map_err(|_| {
            DomainError::InvalidConfig(format!(
                "port must be an integer between 1 and 65535, got '{}'",
                port_text
            ))
        })?;
        let auth = self
            .auth
            .as_deref()
            .unwrap_or_default()
            .parse::<ThriftAuth>()
            .map_err(DomainError::InvalidConfig)?;

        let settings = ThriftSettings {
            host: self.host.clone().unwrap_or_default(),
            port,
            username: self.username.clone().unwrap_or_default(),
            password: self.password.clone(),
            database: self.database.clone().unwrap_or_default(),
            auth,
            fetch_size: self.fetch_size.unwrap_or(DEFAULT_FETCH_SIZE),
            connect_timeout: Duration::from_secs(
                self.connect_timeout_secs
                    .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            ),
        };
        settings
            .validate()
            .map_err(|e| DomainError::InvalidConfig(e.to_string()))?;
        Ok(settings)
    }

    fn jdbc_settings(&self) -> Result<JdbcSettings, DomainError> {
        let store = |path: &Option<PathBuf>, password: &Option<String>, kind: &Option<String>| {
            path.as_ref().map(|p| StoreSettings {
                path: p.clone(),
                password: password.clone(),
                store_type: kind.clone(),
            })
        };

        let settings = JdbcSettings {
            url: self.hive_jdbc_url.clone().unwrap_or_default(),
            driver_class: self.hive_driver_class.clone().unwrap_or_default(),
            username: self.username.clone().unwrap_or_default(),
            password: self.password.clone().unwrap_or_default(),
            driver_jar: self.hive_driver_jar.clone(),
            tls: TlsSettings {
                truststore: store(
                    &self.truststore_path,
                    &self.truststore_password,
                    &self.truststore_type,
                ),
                keystore: store(
                    &self.keystore_path,
                    &self.keystore_password,
                    &self.keystore_type,
                ),
                disable_verification: self.disable_ssl_verification,
            },
            check_java: self.check_java.unwrap_or(true),
        };
        settings
            .validate()
            .map_err(|e| DomainError::InvalidConfig(e.to_string()))?;
        Ok(settings)
    }
}

// --- 2. TYPED PROFILE ---

#[derive(Debug, Clone, Validate)]
pub struct ThriftSettings {
    #[validate(length(min = 1, message = "host cannot be empty"))]
    pub host: String,

    #[validate(range(min = 1, message = "port must be between 1 and 65535"))]
    pub port: u16,

    #[validate(length(min = 1, message = "username cannot be empty"))]
    pub username: String,

    pub password: Option<String>,

    #[validate(length(min = 1, message = "database cannot be empty"))]
    pub database: String,

    pub auth: ThriftAuth,

    #[validate(range(min = 1, message = "fetch_size must be positive"))]
    pub fetch_size: i64,

    #[validate(custom(function = "validate_connect_timeout"))]
    pub connect_timeout: Duration,
}

fn validate_connect_timeout(timeout: &Duration) -> Result<(), ValidationError> {
    if timeout.is_zero() {
        let mut err = ValidationError::new("connect_timeout");
        err.message = Some("connect_timeout_secs must be at least 1".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Validate)]
pub struct JdbcSettings {
    #[validate(custom(function = "validate_jdbc_url"))]
    pub url: String,

    #[validate(length(min = 1, message = "hive_driver_class cannot be empty"))]
    pub driver_class: String,

    pub username: String,
    pub password: String,
    pub driver_jar: Option<PathBuf>,
    pub tls: TlsSettings,
    pub check_java: bool,
}

fn validate_jdbc_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("jdbc:") {
        Ok(())
    } else {
        let mut err = ValidationError::new("jdbc_url");
        err.message = Some("hive_jdbc_url must start with 'jdbc:'".into());
        Err(err)
    }
}

/// Java key material handed to the JVM as `javax.net.ssl.*` properties.
#[derive(Debug, Clone, Default)]
pub struct TlsSettings {
    pub truststore: Option<StoreSettings>,
    pub keystore: Option<StoreSettings>,
    pub disable_verification: bool,
}

impl TlsSettings {
    pub fn is_configured(&self) -> bool {
        self.truststore.is_some() || self.disable_verification
    }
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub path: PathBuf,
    pub password: Option<String>,
    pub store_type: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ConnectionSettings {
    Thrift(ThriftSettings),
    Jdbc(JdbcSettings),
}

impl ConnectionSettings {
    pub fn mode(&self) -> ConnectionMode {
        match self {
            ConnectionSettings::Thrift(_) => ConnectionMode::Thrift,
            ConnectionSettings::Jdbc(_) => ConnectionMode::Jdbc,
        }
    }

    /// Human-readable target for logs; never includes credentials.
    pub fn target(&self) -> String {
        match self {
            ConnectionSettings::Thrift(t) => format!("{}:{}/{}", t.host, t.port, t.database),
            ConnectionSettings::Jdbc(j) => j.url.clone(),
        }
    }
}

/// A fully resolved profile: one connection plus its query/output hints.
#[derive(Debug, Clone)]
pub struct HiveProfile {
    pub tag: Option<String>,
    pub config_path: PathBuf,
    pub connection: ConnectionSettings,
    pub query: Option<String>,
    pub query_file: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl HiveProfile {
    /// Directory relative config paths are resolved against.
    pub fn config_dir(&self) -> &Path {
        self.config_path.parent().unwrap_or_else(|| Path::new(""))
    }
}
