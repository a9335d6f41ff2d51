// hiveq-core/src/infrastructure/adapters/mod.rs

pub mod jdbc;
pub mod thrift;

use tracing::{info, instrument};

use crate::domain::profile::{ConnectionSettings, JdbcSettings};
use crate::error::HiveqError;
use crate::infrastructure::java::check_java_runtime;
use crate::ports::connector::Connector;

/// Opens the connector matching the profile's connection mode.
#[instrument(skip(settings), fields(mode = %settings.mode(), target = %settings.target()))]
pub fn connect(settings: &ConnectionSettings) -> Result<Box<dyn Connector>, HiveqError> {
    match settings {
        ConnectionSettings::Thrift(hs2) => {
            info!("Connecting to HiveServer2 over Thrift");
            Ok(Box::new(thrift::ThriftConnector::connect(hs2)?))
        }
        ConnectionSettings::Jdbc(jdbc_settings) => {
            if jdbc_settings.check_java {
                check_java_runtime(&jdbc_settings.url)?;
            }
            info!("Connecting to Hive over JDBC");
            connect_jdbc(jdbc_settings)
        }
    }
}

#[cfg(feature = "jdbc")]
fn connect_jdbc(settings: &JdbcSettings) -> Result<Box<dyn Connector>, HiveqError> {
    Ok(Box::new(jdbc::JdbcConnector::connect(settings)?))
}

#[cfg(not(feature = "jdbc"))]
fn connect_jdbc(settings: &JdbcSettings) -> Result<Box<dyn Connector>, HiveqError> {
    use crate::domain::remediation::Remediation;
    use crate::infrastructure::error::InfrastructureError;

    Err(InfrastructureError::connection_with(
        settings.url.clone(),
        "this build has no JDBC support",
        Remediation::JdbcFeature,
    )
    .into())
}
