// hiveq-core/src/infrastructure/adapters/jdbc/mod.rs

pub mod options;

#[cfg(feature = "jdbc")]
mod jvm;

#[cfg(feature = "jdbc")]
pub use connector::JdbcConnector;

#[cfg(feature = "jdbc")]
mod connector {
    use jni::objects::{GlobalRef, JObject, JValue};
    use jni::{JNIEnv, JavaVM};
    use std::sync::Arc;
    use tracing::{debug, info, instrument, warn};

    use super::jvm::{call_with_string, describe_error, read_string, shared_jvm};
    use super::options::{effective_url, jvm_options};
    use crate::domain::profile::JdbcSettings;
    use crate::domain::result_set::{ResultSet, Value};
    use crate::error::HiveqError;
    use crate::infrastructure::error::InfrastructureError;
    use crate::ports::connector::Connector;

    /// Hive JDBC driver running in an embedded JVM.
    pub struct JdbcConnector {
        vm: Arc<JavaVM>,
        connection: Option<GlobalRef>,
        target: String,
    }

    impl JdbcConnector {
        #[instrument(skip(settings), fields(url = %settings.url))]
        pub fn connect(settings: &JdbcSettings) -> Result<Self, HiveqError> {
            let target = settings.url.clone();
            if settings.tls.is_configured() {
                info!("Configuring Java SSL settings");
            }
            if settings.tls.disable_verification {
                warn!("SSL certificate verification disabled for this connection");
            }
            if settings.driver_jar.is_none() {
                debug!("No hive_driver_jar configured; relying on the JVM default class path");
            }

            let vm = shared_jvm(&jvm_options(settings))
                .map_err(|msg| InfrastructureError::connection(target.clone(), msg))?;
            let mut env = vm
                .attach_current_thread()
                .map_err(|e| InfrastructureError::connection(target.clone(), e.to_string()))?;

            let url = effective_url(settings);
            let connection = open_connection(&mut env, settings, &url)
                .map_err(|e| describe_error(&mut env, e))
                .map_err(|msg| InfrastructureError::connection(target.clone(), msg))?;
            drop(env);

            info!("JDBC connection established");
            Ok(Self {
                vm,
                connection: Some(connection),
                target,
            })
        }
    }

    fn open_connection(
        env: &mut JNIEnv,
        settings: &JdbcSettings,
        url: &str,
    ) -> jni::errors::Result<GlobalRef> {
        let class_name = env.new_string(&settings.driver_class)?;
        env.call_static_method(
            "java/lang/Class",
            "forName",
            "(Ljava/lang/String;)Ljava/lang/Class;",
            &[JValue::Object(&class_name)],
        )?;

        let jurl = env.new_string(url)?;
        let juser = env.new_string(&settings.username)?;
        let jpass = env.new_string(&settings.password)?;
        let conn = env
            .call_static_method(
                "java/sql/DriverManager",
                "getConnection",
                "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)Ljava/sql/Connection;",
                &[
                    JValue::Object(&jurl),
                    JValue::Object(&juser),
                    JValue::Object(&jpass),
                ],
            )?
            .l()?;
        env.new_global_ref(conn)
    }

    /// Runs the statement and drains its result set, if it produced one.
    fn run_statement(
        env: &mut JNIEnv,
        connection: &JObject,
        query: &str,
    ) -> jni::errors::Result<ResultSet> {
        let statement = env
            .call_method(connection, "createStatement", "()Ljava/sql/Statement;", &[])?
            .l()?;
        // With a Java exception pending no further JNI calls are allowed;
        // closing the connection releases the statement in that case.
        let result = drain(env, &statement, query)?;
        env.call_method(&statement, "close", "()V", &[])?;
        Ok(result)
    }

    fn drain(env: &mut JNIEnv, statement: &JObject, query: &str) -> jni::errors::Result<ResultSet> {
        let has_result_set =
            call_with_string(env, statement, "execute", "(Ljava/lang/String;)Z", query)?.z()?;
        if !has_result_set {
            return Ok(ResultSet::default());
        }
        let rs = env
            .call_method(statement, "getResultSet", "()Ljava/sql/ResultSet;", &[])?
            .l()?;

        let meta = env
            .call_method(&rs, "getMetaData", "()Ljava/sql/ResultSetMetaData;", &[])?
            .l()?;
        let count = env.call_method(&meta, "getColumnCount", "()I", &[])?.i()?;
        let mut columns = Vec::with_capacity(count.max(0) as usize);
        for index in 1..=count {
            let label = env
                .call_method(
                    &meta,
                    "getColumnLabel",
                    "(I)Ljava/lang/String;",
                    &[JValue::Int(index)],
                )?
                .l()?;
            columns.push(read_string(env, label)?.unwrap_or_default());
        }

        let mut rows = Vec::new();
        while env.call_method(&rs, "next", "()Z", &[])?.z()? {
            let mut row = Vec::with_capacity(columns.len());
            for index in 1..=count {
                let cell = env
                    .call_method(&rs, "getString", "(I)Ljava/lang/String;", &[JValue::Int(index)])?
                    .l()?;
                row.push(read_string(env, cell)?.map_or(Value::Null, Value::Text));
            }
            rows.push(row);
        }
        env.call_method(&rs, "close", "()V", &[])?;

        Ok(ResultSet::new(columns, rows))
    }

    impl Connector for JdbcConnector {
        #[instrument(skip(self, query), fields(target = %self.target))]
        fn fetch_all(&mut self, query: &str) -> Result<ResultSet, HiveqError> {
            let connection = self
                .connection
                .clone()
                .ok_or_else(|| HiveqError::InternalError("JDBC connection already closed".into()))?;
            let mut env = self
                .vm
                .attach_current_thread()
                .map_err(|e| InfrastructureError::query(e.to_string(), None))?;

            let result = run_statement(&mut env, connection.as_obj(), query)
                .map_err(|e| describe_error(&mut env, e))
                .map_err(|msg| InfrastructureError::query(msg, None))?;
            debug!(rows = result.row_count(), "Result set drained");
            Ok(result)
        }

        fn close(&mut self) -> Result<(), HiveqError> {
            let Some(connection) = self.connection.take() else {
                return Ok(());
            };
            let mut env = self
                .vm
                .attach_current_thread()
                .map_err(|e| HiveqError::InternalError(e.to_string()))?;
            env.call_method(connection.as_obj(), "close", "()V", &[])
                .map_err(|e| describe_error(&mut env, e))
                .map_err(|msg| InfrastructureError::query(msg, None))?;
            debug!(target = %self.target, "JDBC connection closed");
            Ok(())
        }

        fn engine_name(&self) -> &str {
            "jdbc"
        }
    }

    impl Drop for JdbcConnector {
        fn drop(&mut self) {
            if self.connection.is_some() {
                if let Err(e) = self.close() {
                    warn!(error = %e, "Failed to close JDBC connection");
                }
            }
        }
    }
}
