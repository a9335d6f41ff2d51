// hiveq-core/src/infrastructure/adapters/thrift/mod.rs

pub mod client;
#[cfg(any(test, feature = "test-support"))]
pub mod fake_server;
pub mod messages;
pub mod transport;

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use thrift::protocol::{TBinaryInputProtocol, TBinaryOutputProtocol};
use thrift::transport::{
    TBufferedReadTransport, TBufferedWriteTransport, TFramedReadTransport, TFramedWriteTransport,
};
use tracing::{debug, info, instrument, warn};

use crate::domain::profile::{ThriftAuth, ThriftSettings};
use crate::domain::result_set::ResultSet;
use crate::error::HiveqError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::connector::Connector;

use client::TCliClient;
use messages::{
    FETCH_NEXT, PROTOCOL_V6, PROTOCOL_V8, TCloseSessionReq, TExecuteStatementReq, TFetchResultsReq,
    TOpenSessionReq, TOperationHandle, TSessionHandle, TStatus,
};
use transport::negotiate_plain;

/// Password sent with SASL PLAIN when auth is NONE and none is configured;
/// HiveServer2 ignores it but the mechanism needs a non-empty value.
const ANONYMOUS_PASSWORD: &str = "x";

/// HiveServer2 client speaking TCLIService directly over TCP.
pub struct ThriftConnector {
    client: TCliClient,
    session: Option<TSessionHandle>,
    fetch_size: i64,
    target: String,
}

impl ThriftConnector {
    #[instrument(skip(settings), fields(host = %settings.host, port = settings.port, auth = %settings.auth))]
    pub fn connect(settings: &ThriftSettings) -> Result<Self, HiveqError> {
        let target = format!("{}:{}/{}", settings.host, settings.port, settings.database);
        let password = sasl_password(settings).map_err(|msg| {
            HiveqError::from(InfrastructureError::connection(target.clone(), msg))
        })?;

        let stream = open_socket(&settings.host, settings.port, settings.connect_timeout)
            .map_err(|e| InfrastructureError::connection(target.clone(), e.to_string()))?;
        let client = build_client(stream, settings.auth, &settings.username, password.as_deref())
            .map_err(|e| InfrastructureError::connection(target.clone(), e.to_string()))?;

        Self::open(client, settings, target)
    }

    /// Opens a session on an already negotiated transport.
    fn open(
        mut client: TCliClient,
        settings: &ThriftSettings,
        target: String,
    ) -> Result<Self, HiveqError> {
        let mut configuration = BTreeMap::new();
        configuration.insert("use:database".to_string(), settings.database.clone());

        let req = TOpenSessionReq {
            client_protocol: PROTOCOL_V8,
            username: Some(settings.username.clone()),
            password: settings.password.clone(),
            configuration,
        };
        let resp = client
            .open_session(&req)
            .map_err(|e| InfrastructureError::connection(target.clone(), e.to_string()))?;
        if resp.status.is_failure() {
            return Err(InfrastructureError::connection(target, resp.status.describe()).into());
        }
        let session = resp.session_handle.ok_or_else(|| {
            InfrastructureError::connection(target.clone(), "server returned no session handle")
        })?;

        info!(
            server_protocol = resp.server_protocol_version,
            columnar = resp.server_protocol_version >= PROTOCOL_V6,
            "HiveServer2 session opened"
        );
        Ok(Self {
            client,
            session: Some(session),
            fetch_size: settings.fetch_size,
            target,
        })
    }

    fn fetch_operation(
        &mut self,
        operation: &TOperationHandle,
    ) -> Result<ResultSet, HiveqError> {
        if !operation.has_result_set {
            debug!("Statement produced no result set");
            return Ok(ResultSet::default());
        }

        let metadata = self
            .client
            .get_result_set_metadata(operation)
            .map_err(|e| InfrastructureError::rpc(&self.target, e))?;
        check_status(&metadata.status)?;
        let columns = metadata.columns.unwrap_or_default();

        let mut rows = Vec::new();
        loop {
            let req = TFetchResultsReq {
                operation_handle: operation,
                orientation: FETCH_NEXT,
                max_rows: self.fetch_size,
            };
            let batch = self
                .client
                .fetch_results(&req)
                .map_err(|e| InfrastructureError::rpc(&self.target, e))?;
            check_status(&batch.status)?;
            // hasMoreRows is unreliable on several Hive versions; an empty
            // batch is the only trustworthy end marker.
            if batch.rows.is_empty() {
                break;
            }
            debug!(batch = batch.rows.len(), total = rows.len() + batch.rows.len(), "Fetched rows");
            rows.extend(batch.rows);
        }

        Ok(ResultSet::new(columns, rows))
    }
}

impl Connector for ThriftConnector {
    #[instrument(skip(self, query), fields(target = %self.target))]
    fn fetch_all(&mut self, query: &str) -> Result<ResultSet, HiveqError> {
        let session = self
            .session
            .clone()
            .ok_or_else(|| HiveqError::InternalError("Hive session already closed".into()))?;

        let req = TExecuteStatementReq {
            session_handle: session,
            statement: query.to_string(),
            run_async: false,
        };
        let resp = self
            .client
            .execute_statement(&req)
            .map_err(|e| InfrastructureError::rpc(&self.target, e))?;
        check_status(&resp.status)?;
        let operation = resp.operation_handle.ok_or_else(|| {
            InfrastructureError::query("server returned no operation handle", None)
        })?;

        let result = self.fetch_operation(&operation);

        match self.client.close_operation(&operation) {
            Ok(resp) if resp.status.is_failure() => {
                warn!(error = %resp.status.describe(), "Failed to close operation")
            }
            Err(e) => warn!(error = %e, "Failed to close operation"),
            Ok(_) => {}
        }

        result
    }

    fn close(&mut self) -> Result<(), HiveqError> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        let resp = self
            .client
            .close_session(&TCloseSessionReq {
                session_handle: &session,
            })
            .map_err(|e| InfrastructureError::rpc(&self.target, e))?;
        check_status(&resp.status)?;
        debug!(target = %self.target, "HiveServer2 session closed");
        Ok(())
    }

    fn engine_name(&self) -> &str {
        "thrift"
    }
}

impl Drop for ThriftConnector {
    fn drop(&mut self) {
        if self.session.is_some() {
            if let Err(e) = self.close() {
                warn!(error = %e, "Failed to close Hive session");
            }
        }
    }
}

fn check_status(status: &TStatus) -> Result<(), InfrastructureError> {
    if status.is_failure() {
        return Err(InfrastructureError::query(
            status.describe(),
            status.sql_state.clone(),
        ));
    }
    Ok(())
}

/// Credential for the SASL PLAIN exchange, `None` when the transport is raw.
fn sasl_password(settings: &ThriftSettings) -> Result<Option<String>, String> {
    match settings.auth {
        ThriftAuth::NoSasl => Ok(None),
        ThriftAuth::None => Ok(Some(
            settings
                .password
                .clone()
                .unwrap_or_else(|| ANONYMOUS_PASSWORD.to_string()),
        )),
        ThriftAuth::Ldap | ThriftAuth::Custom => match &settings.password {
            Some(p) if !p.is_empty() => Ok(Some(p.clone())),
            _ => Err(format!("auth {} requires a password", settings.auth)),
        },
        ThriftAuth::Kerberos => Err(
            "KERBEROS authentication is not supported; use NONE, NOSASL, LDAP or CUSTOM".into(),
        ),
    }
}

fn open_socket(host: &str, port: u16, timeout: Duration) -> std::io::Result<TcpStream> {
    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("could not resolve {}", host),
        )
    }))
}

fn build_client(
    mut stream: TcpStream,
    auth: ThriftAuth,
    username: &str,
    password: Option<&str>,
) -> std::io::Result<TCliClient> {
    let read_half = stream.try_clone()?;
    let (reader, writer): (Box<dyn Read + Send>, Box<dyn Write + Send>) = match password {
        Some(password) if auth.uses_sasl() => {
            negotiate_plain(&mut stream, username, password)?;
            (
                Box::new(TFramedReadTransport::new(read_half)),
                Box::new(TFramedWriteTransport::new(stream)),
            )
        }
        _ => (
            Box::new(TBufferedReadTransport::new(read_half)),
            Box::new(TBufferedWriteTransport::new(stream)),
        ),
    };
    Ok(TCliClient::new(
        Box::new(TBinaryInputProtocol::new(reader, true)),
        Box::new(TBinaryOutputProtocol::new(writer, true)),
    ))
}
