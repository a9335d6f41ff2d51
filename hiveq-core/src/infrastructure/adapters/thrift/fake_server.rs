// hiveq-core/src/infrastructure/adapters/thrift/fake_server.rs
//
// In-process HiveServer2 stand-in for tests (`--features test-support`).
// Speaks the same TCLIService codecs as the client, one connection per server.

use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use thrift::protocol::{
    TBinaryInputProtocol, TBinaryOutputProtocol, TFieldIdentifier, TInputProtocol,
    TMessageIdentifier, TMessageType, TOutputProtocol, TStructIdentifier, TType,
};
use thrift::transport::{
    TBufferedReadTransport, TBufferedWriteTransport, TFramedReadTransport, TFramedWriteTransport,
};

use super::messages::{
    PROTOCOL_V8, TExecuteStatementResp, TGetResultSetMetadataResp, THandleIdentifier,
    TOpenSessionResp, TOperationHandle, TSessionHandle, TStatus, TStatusResp, TestColumn,
    TestFetchResultsResp, WriteThrift, status_code,
};

/// What the fake server answers.
#[derive(Debug, Clone, Copy)]
pub enum Script {
    /// `_c0` INT and `label` STRING, three rows over two batches.
    TwoColumns,
    /// `SELECT 1`: a single `_c0` column holding 1.
    SelectOne,
    /// ExecuteStatement fails with SQL state 42000.
    ExecuteError(&'static str),
    /// OpenSession succeeds, then the socket is dropped.
    HangUpAfterOpen,
}

/// Binds a localhost port and serves a single connection on a thread.
/// With `sasl` the PLAIN handshake runs first and traffic is framed.
/// Every method name the server sees is sent back through the receiver.
pub fn spawn_server(script: Script, sasl: bool) -> io::Result<(u16, mpsc::Receiver<String>)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || -> thrift::Result<()> {
        let (mut stream, _) = listener.accept()?;
        if sasl {
            accept_plain(&mut stream, &tx)?;
        }
        let read_half = stream.try_clone()?;
        let (reader, writer): (Box<dyn Read + Send>, Box<dyn Write + Send>) = if sasl {
            (
                Box::new(TFramedReadTransport::new(read_half)),
                Box::new(TFramedWriteTransport::new(stream)),
            )
        } else {
            (
                Box::new(TBufferedReadTransport::new(read_half)),
                Box::new(TBufferedWriteTransport::new(stream)),
            )
        };
        let mut i = TBinaryInputProtocol::new(reader, true);
        let mut o = TBinaryOutputProtocol::new(writer, true);
        serve(&mut i, &mut o, script, &tx)
    });

    Ok((port, rx))
}

/// Server half of SASL PLAIN: reads START and the credentials, answers
/// COMPLETE. Both payloads go to `calls` with NULs shown as `|`.
fn accept_plain(stream: &mut TcpStream, calls: &mpsc::Sender<String>) -> io::Result<()> {
    for _ in 0..2 {
        let mut header = [0u8; 5];
        stream.read_exact(&mut header)?;
        let len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;
        let mut payload = vec![0u8; len];
        stream.read_exact(&mut payload)?;
        let text = String::from_utf8_lossy(&payload).replace('\0', "|");
        let _ = calls.send(format!("SASL {}", text));
    }
    stream.write_all(&[5, 0, 0, 0, 0])?;
    stream.flush()
}

fn serve(
    i: &mut dyn TInputProtocol,
    o: &mut dyn TOutputProtocol,
    script: Script,
    calls: &mpsc::Sender<String>,
) -> thrift::Result<()> {
    let mut fetches = 0;
    loop {
        // Client hung up
        let Ok(msg) = i.read_message_begin() else {
            return Ok(());
        };
        i.skip(TType::Struct)?;
        i.read_message_end()?;
        let _ = calls.send(msg.name.clone());
        let seq = msg.sequence_number;

        match msg.name.as_str() {
            "OpenSession" => {
                let resp = TOpenSessionResp {
                    status: ok(),
                    server_protocol_version: PROTOCOL_V8,
                    session_handle: Some(TSessionHandle {
                        session_id: handle(1),
                    }),
                    configuration: BTreeMap::new(),
                };
                reply(o, "OpenSession", seq, &resp)?;
                if matches!(script, Script::HangUpAfterOpen) {
                    return Ok(());
                }
            }
            "ExecuteStatement" => {
                let resp = match script {
                    Script::ExecuteError(message) => TExecuteStatementResp {
                        status: TStatus {
                            status_code: status_code::ERROR,
                            sql_state: Some("42000".into()),
                            error_message: Some(message.into()),
                            ..Default::default()
                        },
                        operation_handle: None,
                    },
                    _ => TExecuteStatementResp {
                        status: ok(),
                        operation_handle: Some(TOperationHandle {
                            operation_id: handle(2),
                            operation_type: 0,
                            has_result_set: true,
                            modified_row_count: None,
                        }),
                    },
                };
                reply(o, "ExecuteStatement", seq, &resp)?;
            }
            "GetResultSetMetadata" => {
                let columns = match script {
                    Script::SelectOne => vec!["_c0".to_string()],
                    _ => vec!["_c0".to_string(), "label".to_string()],
                };
                let resp = TGetResultSetMetadataResp {
                    status: ok(),
                    columns: Some(columns),
                };
                reply(o, "GetResultSetMetadata", seq, &resp)?;
            }
            "FetchResults" => {
                fetches += 1;
                let resp = TestFetchResultsResp {
                    status: ok(),
                    has_more_rows: false,
                    columns: batch(script, fetches),
                };
                reply(o, "FetchResults", seq, &resp)?;
            }
            "CloseOperation" | "CloseSession" => {
                let name = msg.name.clone();
                reply(o, &name, seq, &TStatusResp { status: ok() })?;
            }
            _ => return Ok(()),
        }
    }
}

/// Column batches per fetch; the last one is always empty.
fn batch(script: Script, fetch: usize) -> Vec<TestColumn> {
    match (script, fetch) {
        (Script::SelectOne, 1) => vec![TestColumn::I32(vec![1], vec![])],
        (Script::SelectOne, _) => vec![TestColumn::I32(vec![], vec![])],
        (_, 1) => vec![
            TestColumn::I32(vec![1, 2], vec![]),
            TestColumn::Text(vec!["a".into(), String::new()], vec![0b10]),
        ],
        (_, 2) => vec![
            TestColumn::I32(vec![3], vec![]),
            TestColumn::Text(vec!["c".into()], vec![]),
        ],
        _ => vec![
            TestColumn::I32(vec![], vec![]),
            TestColumn::Text(vec![], vec![]),
        ],
    }
}

fn ok() -> TStatus {
    TStatus {
        status_code: status_code::SUCCESS,
        ..Default::default()
    }
}

fn handle(tag: u8) -> THandleIdentifier {
    THandleIdentifier {
        guid: vec![tag; 16],
        secret: vec![tag; 16],
    }
}

fn reply(
    o: &mut dyn TOutputProtocol,
    name: &str,
    seq: i32,
    body: &dyn WriteThrift,
) -> thrift::Result<()> {
    o.write_message_begin(&TMessageIdentifier::new(name, TMessageType::Reply, seq))?;
    o.write_struct_begin(&TStructIdentifier::new("result"))?;
    o.write_field_begin(&TFieldIdentifier::new("success", TType::Struct, 0))?;
    body.write_to(o)?;
    o.write_field_end()?;
    o.write_field_stop()?;
    o.write_struct_end()?;
    o.write_message_end()?;
    o.flush()
}
