// hiveq-core/src/infrastructure/adapters/thrift/messages.rs
//
// The slice of HiveServer2's TCLIService IDL this client speaks: open/close
// session, execute, result-set metadata, fetch, close operation. Field ids
// follow TCLIService.thrift.

use std::collections::BTreeMap;
#[cfg(any(test, feature = "test-support"))]
use thrift::protocol::TListIdentifier;
use thrift::protocol::{
    TFieldIdentifier, TInputProtocol, TMapIdentifier, TOutputProtocol, TStructIdentifier, TType,
    field_id, verify_required_field_exists,
};

use crate::domain::result_set::Value;

/// HIVE_CLI_SERVICE_PROTOCOL_V8, what the client asks for.
pub const PROTOCOL_V8: i32 = 7;
/// From V6 on, result sets travel column-wise.
pub const PROTOCOL_V6: i32 = 5;

pub const FETCH_NEXT: i32 = 0;

pub mod status_code {
    #[cfg(any(test, feature = "test-support"))]
    pub const SUCCESS: i32 = 0;
    #[cfg(test)]
    pub const SUCCESS_WITH_INFO: i32 = 1;
    pub const ERROR: i32 = 3;
    pub const INVALID_HANDLE: i32 = 4;
}

pub trait WriteThrift {
    fn write_to(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()>;
}

pub trait ReadThrift: Sized {
    fn read_from(i: &mut dyn TInputProtocol) -> thrift::Result<Self>;
}

// --- 1. PROTOCOL HELPERS ---

/// Reads the next field header; `None` on STOP.
pub(crate) fn next_field(i: &mut dyn TInputProtocol) -> thrift::Result<Option<(i16, TType)>> {
    let field = i.read_field_begin()?;
    if field.field_type == TType::Stop {
        return Ok(None);
    }
    Ok(Some((field_id(&field)?, field.field_type)))
}

fn field(o: &mut dyn TOutputProtocol, name: &str, ty: TType, id: i16) -> thrift::Result<()> {
    o.write_field_begin(&TFieldIdentifier::new(name, ty, id))
}

fn write_struct_field<T: WriteThrift>(
    o: &mut dyn TOutputProtocol,
    name: &str,
    id: i16,
    value: &T,
) -> thrift::Result<()> {
    field(o, name, TType::Struct, id)?;
    value.write_to(o)?;
    o.write_field_end()
}

fn write_string_field(
    o: &mut dyn TOutputProtocol,
    name: &str,
    id: i16,
    value: &str,
) -> thrift::Result<()> {
    field(o, name, TType::String, id)?;
    o.write_string(value)?;
    o.write_field_end()
}

fn write_string_map(
    o: &mut dyn TOutputProtocol,
    name: &str,
    id: i16,
    map: &BTreeMap<String, String>,
) -> thrift::Result<()> {
    field(o, name, TType::Map, id)?;
    o.write_map_begin(&TMapIdentifier::new(
        TType::String,
        TType::String,
        map.len() as i32,
    ))?;
    for (k, v) in map {
        o.write_string(k)?;
        o.write_string(v)?;
    }
    o.write_map_end()?;
    o.write_field_end()
}

fn read_string_list(i: &mut dyn TInputProtocol) -> thrift::Result<Vec<String>> {
    let list = i.read_list_begin()?;
    let mut out = Vec::with_capacity(list.size.max(0) as usize);
    for _ in 0..list.size {
        out.push(i.read_string()?);
    }
    i.read_list_end()?;
    Ok(out)
}

fn read_string_map(i: &mut dyn TInputProtocol) -> thrift::Result<BTreeMap<String, String>> {
    let map = i.read_map_begin()?;
    let mut out = BTreeMap::new();
    for _ in 0..map.size {
        let k = i.read_string()?;
        let v = i.read_string()?;
        out.insert(k, v);
    }
    i.read_map_end()?;
    Ok(out)
}

// --- 2. STATUS & HANDLES ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TStatus {
    pub status_code: i32,
    pub info_messages: Vec<String>,
    pub sql_state: Option<String>,
    pub error_code: Option<i32>,
    pub error_message: Option<String>,
}

impl TStatus {
    pub fn is_failure(&self) -> bool {
        matches!(
            self.status_code,
            status_code::ERROR | status_code::INVALID_HANDLE
        )
    }

    /// Best human-readable description of a failed status.
    pub fn describe(&self) -> String {
        self.error_message
            .clone()
            .or_else(|| self.info_messages.first().cloned())
            .unwrap_or_else(|| format!("server returned status code {}", self.status_code))
    }
}

impl ReadThrift for TStatus {
    fn read_from(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        i.read_struct_begin()?;
        let mut code = None;
        let mut status = TStatus::default();
        while let Some((id, ty)) = next_field(i)? {
            match (id, ty) {
                (1, TType::I32) => code = Some(i.read_i32()?),
                (2, TType::List) => status.info_messages = read_string_list(i)?,
                (3, TType::String) => status.sql_state = Some(i.read_string()?),
                (4, TType::I32) => status.error_code = Some(i.read_i32()?),
                (5, TType::String) => status.error_message = Some(i.read_string()?),
                _ => i.skip(ty)?,
            }
            i.read_field_end()?;
        }
        i.read_struct_end()?;
        verify_required_field_exists("TStatus.statusCode", &code)?;
        status.status_code = code.unwrap_or_default();
        Ok(status)
    }
}

#[cfg(any(test, feature = "test-support"))]
impl WriteThrift for TStatus {
    fn write_to(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o.write_struct_begin(&TStructIdentifier::new("TStatus"))?;
        field(o, "statusCode", TType::I32, 1)?;
        o.write_i32(self.status_code)?;
        o.write_field_end()?;
        if !self.info_messages.is_empty() {
            field(o, "infoMessages", TType::List, 2)?;
            o.write_list_begin(&TListIdentifier::new(
                TType::String,
                self.info_messages.len() as i32,
            ))?;
            for msg in &self.info_messages {
                o.write_string(msg)?;
            }
            o.write_list_end()?;
            o.write_field_end()?;
        }
        if let Some(state) = &self.sql_state {
            write_string_field(o, "sqlState", 3, state)?;
        }
        if let Some(code) = self.error_code {
            field(o, "errorCode", TType::I32, 4)?;
            o.write_i32(code)?;
            o.write_field_end()?;
        }
        if let Some(msg) = &self.error_message {
            write_string_field(o, "errorMessage", 5, msg)?;
        }
        o.write_field_stop()?;
        o.write_struct_end()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct THandleIdentifier {
    pub guid: Vec<u8>,
    pub secret: Vec<u8>,
}

impl ReadThrift for THandleIdentifier {
    fn read_from(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        i.read_struct_begin()?;
        let mut handle = THandleIdentifier::default();
        while let Some((id, ty)) = next_field(i)? {
            match (id, ty) {
                (1, TType::String) => handle.guid = i.read_bytes()?,
                (2, TType::String) => handle.secret = i.read_bytes()?,
                _ => i.skip(ty)?,
            }
            i.read_field_end()?;
        }
        i.read_struct_end()?;
        Ok(handle)
    }
}

impl WriteThrift for THandleIdentifier {
    fn write_to(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o.write_struct_begin(&TStructIdentifier::new("THandleIdentifier"))?;
        field(o, "guid", TType::String, 1)?;
        o.write_bytes(&self.guid)?;
        o.write_field_end()?;
        field(o, "secret", TType::String, 2)?;
        o.write_bytes(&self.secret)?;
        o.write_field_end()?;
        o.write_field_stop()?;
        o.write_struct_end()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TSessionHandle {
    pub session_id: THandleIdentifier,
}

impl ReadThrift for TSessionHandle {
    fn read_from(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        i.read_struct_begin()?;
        let mut session_id = None;
        while let Some((id, ty)) = next_field(i)? {
            match (id, ty) {
                (1, TType::Struct) => session_id = Some(THandleIdentifier::read_from(i)?),
                _ => i.skip(ty)?,
            }
            i.read_field_end()?;
        }
        i.read_struct_end()?;
        verify_required_field_exists("TSessionHandle.sessionId", &session_id)?;
        Ok(TSessionHandle {
            session_id: session_id.unwrap_or_default(),
        })
    }
}

impl WriteThrift for TSessionHandle {
    fn write_to(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o.write_struct_begin(&TStructIdentifier::new("TSessionHandle"))?;
        write_struct_field(o, "sessionId", 1, &self.session_id)?;
        o.write_field_stop()?;
        o.write_struct_end()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TOperationHandle {
    pub operation_id: THandleIdentifier,
    pub operation_type: i32,
    pub has_result_set: bool,
    pub modified_row_count: Option<f64>,
}

impl ReadThrift for TOperationHandle {
    fn read_from(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        i.read_struct_begin()?;
        let mut handle = TOperationHandle::default();
        while let Some((id, ty)) = next_field(i)? {
            match (id, ty) {
                (1, TType::Struct) => handle.operation_id = THandleIdentifier::read_from(i)?,
                (2, TType::I32) => handle.operation_type = i.read_i32()?,
                (3, TType::Bool) => handle.has_result_set = i.read_bool()?,
                (4, TType::Double) => handle.modified_row_count = Some(i.read_double()?),
                _ => i.skip(ty)?,
            }
            i.read_field_end()?;
        }
        i.read_struct_end()?;
        Ok(handle)
    }
}

impl WriteThrift for TOperationHandle {
    fn write_to(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o.write_struct_begin(&TStructIdentifier::new("TOperationHandle"))?;
        write_struct_field(o, "operationId", 1, &self.operation_id)?;
        field(o, "operationType", TType::I32, 2)?;
        o.write_i32(self.operation_type)?;
        o.write_field_end()?;
        field(o, "hasResultSet", TType::Bool, 3)?;
        o.write_bool(self.has_result_set)?;
        o.write_field_end()?;
        if let Some(count) = self.modified_row_count {
            field(o, "modifiedRowCount", TType::Double, 4)?;
            o.write_double(count)?;
            o.write_field_end()?;
        }
        o.write_field_stop()?;
        o.write_struct_end()
    }
}

// --- 3. REQUESTS ---

#[derive(Debug, Clone)]
pub struct TOpenSessionReq {
    pub client_protocol: i32,
    pub username: Option<String>,
    pub password: Option<String>,
    pub configuration: BTreeMap<String, String>,
}

impl WriteThrift for TOpenSessionReq {
    fn write_to(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o.write_struct_begin(&TStructIdentifier::new("TOpenSessionReq"))?;
        field(o, "client_protocol", TType::I32, 1)?;
        o.write_i32(self.client_protocol)?;
        o.write_field_end()?;
        if let Some(user) = &self.username {
            write_string_field(o, "username", 2, user)?;
        }
        if let Some(password) = &self.password {
            write_string_field(o, "password", 3, password)?;
        }
        if !self.configuration.is_empty() {
            write_string_map(o, "configuration", 4, &self.configuration)?;
        }
        o.write_field_stop()?;
        o.write_struct_end()
    }
}

#[derive(Debug, Clone)]
pub struct TExecuteStatementReq {
    pub session_handle: TSessionHandle,
    pub statement: String,
    pub run_async: bool,
}

impl WriteThrift for TExecuteStatementReq {
    fn write_to(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o.write_struct_begin(&TStructIdentifier::new("TExecuteStatementReq"))?;
        write_struct_field(o, "sessionHandle", 1, &self.session_handle)?;
        write_string_field(o, "statement", 2, &self.statement)?;
        field(o, "runAsync", TType::Bool, 4)?;
        o.write_bool(self.run_async)?;
        o.write_field_end()?;
        o.write_field_stop()?;
        o.write_struct_end()
    }
}

/// Request wrapping just an operation handle (metadata, close).
#[derive(Debug, Clone)]
pub struct TOperationReq<'a> {
    pub struct_name: &'static str,
    pub operation_handle: &'a TOperationHandle,
}

impl WriteThrift for TOperationReq<'_> {
    fn write_to(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o.write_struct_begin(&TStructIdentifier::new(self.struct_name))?;
        write_struct_field(o, "operationHandle", 1, self.operation_handle)?;
        o.write_field_stop()?;
        o.write_struct_end()
    }
}

#[derive(Debug, Clone)]
pub struct TFetchResultsReq<'a> {
    pub operation_handle: &'a TOperationHandle,
    pub orientation: i32,
    pub max_rows: i64,
}

impl WriteThrift for TFetchResultsReq<'_> {
    fn write_to(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o.write_struct_begin(&TStructIdentifier::new("TFetchResultsReq"))?;
        write_struct_field(o, "operationHandle", 1, self.operation_handle)?;
        field(o, "orientation", TType::I32, 2)?;
        o.write_i32(self.orientation)?;
        o.write_field_end()?;
        field(o, "maxRows", TType::I64, 3)?;
        o.write_i64(self.max_rows)?;
        o.write_field_end()?;
        o.write_field_stop()?;
        o.write_struct_end()
    }
}

#[derive(Debug, Clone)]
pub struct TCloseSessionReq<'a> {
    pub session_handle: &'a TSessionHandle,
}

impl WriteThrift for TCloseSessionReq<'_> {
    fn write_to(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o.write_struct_begin(&TStructIdentifier::new("TCloseSessionReq"))?;
        write_struct_field(o, "sessionHandle", 1, self.session_handle)?;
        o.write_field_stop()?;
        o.write_struct_end()
    }
}

// --- 4. RESPONSES ---

#[derive(Debug, Clone, Default)]
pub struct TOpenSessionResp {
    pub status: TStatus,
    pub server_protocol_version: i32,
    pub session_handle: Option<TSessionHandle>,
    pub configuration: BTreeMap<String, String>,
}

impl ReadThrift for TOpenSessionResp {
    fn read_from(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        i.read_struct_begin()?;
        let mut status = None;
        let mut resp = TOpenSessionResp::default();
        while let Some((id, ty)) = next_field(i)? {
            match (id, ty) {
                (1, TType::Struct) => status = Some(TStatus::read_from(i)?),
                (2, TType::I32) => resp.server_protocol_version = i.read_i32()?,
                (3, TType::Struct) => resp.session_handle = Some(TSessionHandle::read_from(i)?),
                (4, TType::Map) => resp.configuration = read_string_map(i)?,
                _ => i.skip(ty)?,
            }
            i.read_field_end()?;
        }
        i.read_struct_end()?;
        verify_required_field_exists("TOpenSessionResp.status", &status)?;
        resp.status = status.unwrap_or_default();
        Ok(resp)
    }
}

#[cfg(any(test, feature = "test-support"))]
impl WriteThrift for TOpenSessionResp {
    fn write_to(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o.write_struct_begin(&TStructIdentifier::new("TOpenSessionResp"))?;
        write_struct_field(o, "status", 1, &self.status)?;
        field(o, "serverProtocolVersion", TType::I32, 2)?;
        o.write_i32(self.server_protocol_version)?;
        o.write_field_end()?;
        if let Some(handle) = &self.session_handle {
            write_struct_field(o, "sessionHandle", 3, handle)?;
        }
        o.write_field_stop()?;
        o.write_struct_end()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TExecuteStatementResp {
    pub status: TStatus,
    pub operation_handle: Option<TOperationHandle>,
}

impl ReadThrift for TExecuteStatementResp {
    fn read_from(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        i.read_struct_begin()?;
        let mut status = None;
        let mut operation_handle = None;
        while let Some((id, ty)) = next_field(i)? {
            match (id, ty) {
                (1, TType::Struct) => status = Some(TStatus::read_from(i)?),
                (2, TType::Struct) => operation_handle = Some(TOperationHandle::read_from(i)?),
                _ => i.skip(ty)?,
            }
            i.read_field_end()?;
        }
        i.read_struct_end()?;
        verify_required_field_exists("TExecuteStatementResp.status", &status)?;
        Ok(TExecuteStatementResp {
            status: status.unwrap_or_default(),
            operation_handle,
        })
    }
}

#[cfg(any(test, feature = "test-support"))]
impl WriteThrift for TExecuteStatementResp {
    fn write_to(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o.write_struct_begin(&TStructIdentifier::new("TExecuteStatementResp"))?;
        write_struct_field(o, "status", 1, &self.status)?;
        if let Some(handle) = &self.operation_handle {
            write_struct_field(o, "operationHandle", 2, handle)?;
        }
        o.write_field_stop()?;
        o.write_struct_end()
    }
}

/// Responses that only carry a status (CloseOperation, CloseSession).
#[derive(Debug, Clone, Default)]
pub struct TStatusResp {
    pub status: TStatus,
}

impl ReadThrift for TStatusResp {
    fn read_from(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        i.read_struct_begin()?;
        let mut status = None;
        while let Some((id, ty)) = next_field(i)? {
            match (id, ty) {
                (1, TType::Struct) => status = Some(TStatus::read_from(i)?),
                _ => i.skip(ty)?,
            }
            i.read_field_end()?;
        }
        i.read_struct_end()?;
        verify_required_field_exists("status", &status)?;
        Ok(TStatusResp {
            status: status.unwrap_or_default(),
        })
    }
}

#[cfg(any(test, feature = "test-support"))]
impl WriteThrift for TStatusResp {
    fn write_to(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o.write_struct_begin(&TStructIdentifier::new("TStatusResp"))?;
        write_struct_field(o, "status", 1, &self.status)?;
        o.write_field_stop()?;
        o.write_struct_end()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TGetResultSetMetadataResp {
    pub status: TStatus,
    /// Column names in position order; type descriptors are not needed.
    pub columns: Option<Vec<String>>,
}

impl ReadThrift for TGetResultSetMetadataResp {
    fn read_from(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        i.read_struct_begin()?;
        let mut status = None;
        let mut columns = None;
        while let Some((id, ty)) = next_field(i)? {
            match (id, ty) {
                (1, TType::Struct) => status = Some(TStatus::read_from(i)?),
                (2, TType::Struct) => columns = Some(read_table_schema(i)?),
                _ => i.skip(ty)?,
            }
            i.read_field_end()?;
        }
        i.read_struct_end()?;
        verify_required_field_exists("TGetResultSetMetadataResp.status", &status)?;
        Ok(TGetResultSetMetadataResp {
            status: status.unwrap_or_default(),
            columns,
        })
    }
}

#[cfg(any(test, feature = "test-support"))]
impl WriteThrift for TGetResultSetMetadataResp {
    fn write_to(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o.write_struct_begin(&TStructIdentifier::new("TGetResultSetMetadataResp"))?;
        write_struct_field(o, "status", 1, &self.status)?;
        if let Some(columns) = &self.columns {
            field(o, "schema", TType::Struct, 2)?;
            write_table_schema(o, columns)?;
            o.write_field_end()?;
        }
        o.write_field_stop()?;
        o.write_struct_end()
    }
}

/// TTableSchema { 1: list<TColumnDesc> }, keeping only name (1) and
/// position (3).
fn read_table_schema(i: &mut dyn TInputProtocol) -> thrift::Result<Vec<String>> {
    i.read_struct_begin()?;
    let mut described: Vec<(i32, String)> = Vec::new();
    while let Some((id, ty)) = next_field(i)? {
        match (id, ty) {
            (1, TType::List) => {
                let list = i.read_list_begin()?;
                for _ in 0..list.size {
                    described.push(read_column_desc(i)?);
                }
                i.read_list_end()?;
            }
            _ => i.skip(ty)?,
        }
        i.read_field_end()?;
    }
    i.read_struct_end()?;
    described.sort_by_key(|(position, _)| *position);
    Ok(described.into_iter().map(|(_, name)| name).collect())
}

fn read_column_desc(i: &mut dyn TInputProtocol) -> thrift::Result<(i32, String)> {
    i.read_struct_begin()?;
    let mut name = None;
    let mut position = 0;
    while let Some((id, ty)) = next_field(i)? {
        match (id, ty) {
            (1, TType::String) => name = Some(i.read_string()?),
            (3, TType::I32) => position = i.read_i32()?,
            _ => i.skip(ty)?,
        }
        i.read_field_end()?;
    }
    i.read_struct_end()?;
    verify_required_field_exists("TColumnDesc.columnName", &name)?;
    Ok((position, name.unwrap_or_default()))
}

#[cfg(any(test, feature = "test-support"))]
fn write_table_schema(o: &mut dyn TOutputProtocol, columns: &[String]) -> thrift::Result<()> {
    o.write_struct_begin(&TStructIdentifier::new("TTableSchema"))?;
    field(o, "columns", TType::List, 1)?;
    o.write_list_begin(&TListIdentifier::new(TType::Struct, columns.len() as i32))?;
    for (position, name) in columns.iter().enumerate() {
        o.write_struct_begin(&TStructIdentifier::new("TColumnDesc"))?;
        write_string_field(o, "columnName", 1, name)?;
        // typeDesc: TTypeDesc { 1: list<TTypeEntry> } with STRING_TYPE (7)
        field(o, "typeDesc", TType::Struct, 2)?;
        o.write_struct_begin(&TStructIdentifier::new("TTypeDesc"))?;
        field(o, "types", TType::List, 1)?;
        o.write_list_begin(&TListIdentifier::new(TType::Struct, 1))?;
        o.write_struct_begin(&TStructIdentifier::new("TTypeEntry"))?;
        field(o, "primitiveEntry", TType::Struct, 1)?;
        o.write_struct_begin(&TStructIdentifier::new("TPrimitiveTypeEntry"))?;
        field(o, "type", TType::I32, 1)?;
        o.write_i32(7)?;
        o.write_field_end()?;
        o.write_field_stop()?;
        o.write_struct_end()?;
        o.write_field_end()?;
        o.write_field_stop()?;
        o.write_struct_end()?;
        o.write_list_end()?;
        o.write_field_end()?;
        o.write_field_stop()?;
        o.write_struct_end()?;
        o.write_field_end()?;
        field(o, "position", TType::I32, 3)?;
        o.write_i32(position as i32 + 1)?;
        o.write_field_end()?;
        o.write_field_stop()?;
        o.write_struct_end()?;
    }
    o.write_list_end()?;
    o.write_field_end()?;
    o.write_field_stop()?;
    o.write_struct_end()
}

// --- 5. ROW SETS ---

#[derive(Debug, Clone, Default)]
pub struct TFetchResultsResp {
    pub status: TStatus,
    pub has_more_rows: Option<bool>,
    pub rows: Vec<Vec<Value>>,
}

impl ReadThrift for TFetchResultsResp {
    fn read_from(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        i.read_struct_begin()?;
        let mut status = None;
        let mut resp = TFetchResultsResp::default();
        while let Some((id, ty)) = next_field(i)? {
            match (id, ty) {
                (1, TType::Struct) => status = Some(TStatus::read_from(i)?),
                (2, TType::Bool) => resp.has_more_rows = Some(i.read_bool()?),
                (3, TType::Struct) => resp.rows = read_row_set(i)?,
                _ => i.skip(ty)?,
            }
            i.read_field_end()?;
        }
        i.read_struct_end()?;
        verify_required_field_exists("TFetchResultsResp.status", &status)?;
        resp.status = status.unwrap_or_default();
        Ok(resp)
    }
}

/// TRowSet carries either row-wise `rows` (protocol < V6) or column-wise
/// `columns`. Either way the caller gets rows.
fn read_row_set(i: &mut dyn TInputProtocol) -> thrift::Result<Vec<Vec<Value>>> {
    i.read_struct_begin()?;
    let mut rows: Vec<Vec<Value>> = Vec::new();
    let mut columns: Option<Vec<Vec<Value>>> = None;
    while let Some((id, ty)) = next_field(i)? {
        match (id, ty) {
            (2, TType::List) => {
                let list = i.read_list_begin()?;
                for _ in 0..list.size {
                    rows.push(read_row(i)?);
                }
                i.read_list_end()?;
            }
            (3, TType::List) => {
                let list = i.read_list_begin()?;
                let mut cols = Vec::with_capacity(list.size.max(0) as usize);
                for _ in 0..list.size {
                    cols.push(read_column(i)?);
                }
                i.read_list_end()?;
                columns = Some(cols);
            }
            _ => i.skip(ty)?,
        }
        i.read_field_end()?;
    }
    i.read_struct_end()?;

    match columns {
        Some(cols) if !cols.is_empty() => Ok(transpose(cols)),
        _ => Ok(rows),
    }
}

fn transpose(columns: Vec<Vec<Value>>) -> Vec<Vec<Value>> {
    let height = columns.iter().map(Vec::len).max().unwrap_or(0);
    let mut iters: Vec<_> = columns.into_iter().map(Vec::into_iter).collect();
    (0..height)
        .map(|_| {
            iters
                .iter_mut()
                .map(|col| col.next().unwrap_or(Value::Null))
                .collect()
        })
        .collect()
}

/// TRow { 1: list<TColumnValue> }
fn read_row(i: &mut dyn TInputProtocol) -> thrift::Result<Vec<Value>> {
    i.read_struct_begin()?;
    let mut values = Vec::new();
    while let Some((id, ty)) = next_field(i)? {
        match (id, ty) {
            (1, TType::List) => {
                let list = i.read_list_begin()?;
                for _ in 0..list.size {
                    values.push(read_column_value(i)?);
                }
                i.read_list_end()?;
            }
            _ => i.skip(ty)?,
        }
        i.read_field_end()?;
    }
    i.read_struct_end()?;
    Ok(values)
}

#[derive(Debug, Clone, Copy)]
enum Element {
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    Text,
    Binary,
}

impl Element {
    fn from_union_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Element::Bool),
            2 => Some(Element::Byte),
            3 => Some(Element::I16),
            4 => Some(Element::I32),
            5 => Some(Element::I64),
            6 => Some(Element::Double),
            7 => Some(Element::Text),
            8 => Some(Element::Binary),
            _ => None,
        }
    }

    fn read(self, i: &mut dyn TInputProtocol) -> thrift::Result<Value> {
        Ok(match self {
            Element::Bool => Value::Bool(i.read_bool()?),
            Element::Byte => Value::Int(i64::from(i.read_i8()?)),
            Element::I16 => Value::Int(i64::from(i.read_i16()?)),
            Element::I32 => Value::Int(i64::from(i.read_i32()?)),
            Element::I64 => Value::Int(i.read_i64()?),
            Element::Double => Value::Double(i.read_double()?),
            Element::Text => Value::Text(i.read_string()?),
            Element::Binary => Value::Binary(i.read_bytes()?),
        })
    }
}

/// TColumnValue union: each arm is `struct { 1: optional <T> value }`;
/// an absent value is SQL NULL.
fn read_column_value(i: &mut dyn TInputProtocol) -> thrift::Result<Value> {
    i.read_struct_begin()?;
    let mut value = Value::Null;
    while let Some((id, ty)) = next_field(i)? {
        match (Element::from_union_id(id), ty) {
            (Some(element), TType::Struct) => {
                i.read_struct_begin()?;
                while let Some((inner_id, inner_ty)) = next_field(i)? {
                    if inner_id == 1 {
                        value = element.read(i)?;
                    } else {
                        i.skip(inner_ty)?;
                    }
                    i.read_field_end()?;
                }
                i.read_struct_end()?;
            }
            _ => i.skip(ty)?,
        }
        i.read_field_end()?;
    }
    i.read_struct_end()?;
    Ok(value)
}

/// TColumn union: each arm is `struct { 1: list<T> values, 2: binary nulls }`
/// where bit `n` of `nulls` (LSB first) marks row `n` as NULL.
fn read_column(i: &mut dyn TInputProtocol) -> thrift::Result<Vec<Value>> {
    i.read_struct_begin()?;
    let mut values = Vec::new();
    while let Some((id, ty)) = next_field(i)? {
        match (Element::from_union_id(id), ty) {
            (Some(element), TType::Struct) => values = read_typed_column(i, element)?,
            _ => i.skip(ty)?,
        }
        i.read_field_end()?;
    }
    i.read_struct_end()?;
    Ok(values)
}

fn read_typed_column(i: &mut dyn TInputProtocol, element: Element) -> thrift::Result<Vec<Value>> {
    i.read_struct_begin()?;
    let mut values = Vec::new();
    let mut nulls = Vec::new();
    while let Some((id, ty)) = next_field(i)? {
        match (id, ty) {
            (1, TType::List) => {
                let list = i.read_list_begin()?;
                values.reserve(list.size.max(0) as usize);
                for _ in 0..list.size {
                    values.push(element.read(i)?);
                }
                i.read_list_end()?;
            }
            (2, TType::String) => nulls = i.read_bytes()?,
            _ => i.skip(ty)?,
        }
        i.read_field_end()?;
    }
    i.read_struct_end()?;

    for (row, value) in values.iter_mut().enumerate() {
        if is_null(&nulls, row) {
            *value = Value::Null;
        }
    }
    Ok(values)
}

fn is_null(nulls: &[u8], row: usize) -> bool {
    nulls
        .get(row / 8)
        .is_some_and(|byte| byte & (1 << (row % 8)) != 0)
}

/// Column-wise row set body, used by the in-process test server.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone)]
pub enum TestColumn {
    I32(Vec<i32>, Vec<u8>),
    Text(Vec<String>, Vec<u8>),
}

#[cfg(any(test, feature = "test-support"))]
impl TestColumn {
    fn write_to(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o.write_struct_begin(&TStructIdentifier::new("TColumn"))?;
        let (id, name, element_type, len) = match self {
            TestColumn::I32(v, _) => (4, "i32Val", TType::I32, v.len()),
            TestColumn::Text(v, _) => (7, "stringVal", TType::String, v.len()),
        };
        field(o, name, TType::Struct, id)?;
        o.write_struct_begin(&TStructIdentifier::new("TTypedColumn"))?;
        field(o, "values", TType::List, 1)?;
        o.write_list_begin(&TListIdentifier::new(element_type, len as i32))?;
        let nulls = match self {
            TestColumn::I32(values, nulls) => {
                for v in values {
                    o.write_i32(*v)?;
                }
                nulls
            }
            TestColumn::Text(values, nulls) => {
                for v in values {
                    o.write_string(v)?;
                }
                nulls
            }
        };
        o.write_list_end()?;
        o.write_field_end()?;
        field(o, "nulls", TType::String, 2)?;
        o.write_bytes(nulls)?;
        o.write_field_end()?;
        o.write_field_stop()?;
        o.write_struct_end()?;
        o.write_field_end()?;
        o.write_field_stop()?;
        o.write_struct_end()
    }
}

/// Server side of TFetchResultsResp with a columnar row set.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone, Default)]
pub struct TestFetchResultsResp {
    pub status: TStatus,
    pub has_more_rows: bool,
    pub columns: Vec<TestColumn>,
}

#[cfg(any(test, feature = "test-support"))]
impl WriteThrift for TestFetchResultsResp {
    fn write_to(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o.write_struct_begin(&TStructIdentifier::new("TFetchResultsResp"))?;
        write_struct_field(o, "status", 1, &self.status)?;
        field(o, "hasMoreRows", TType::Bool, 2)?;
        o.write_bool(self.has_more_rows)?;
        o.write_field_end()?;
        field(o, "results", TType::Struct, 3)?;
        o.write_struct_begin(&TStructIdentifier::new("TRowSet"))?;
        field(o, "startRowOffset", TType::I64, 1)?;
        o.write_i64(0)?;
        o.write_field_end()?;
        field(o, "rows", TType::List, 2)?;
        o.write_list_begin(&TListIdentifier::new(TType::Struct, 0))?;
        o.write_list_end()?;
        o.write_field_end()?;
        field(o, "columns", TType::List, 3)?;
        o.write_list_begin(&TListIdentifier::new(TType::Struct, self.columns.len() as i32))?;
        for column in &self.columns {
            column.write_to(o)?;
        }
        o.write_list_end()?;
        o.write_field_end()?;
        o.write_field_stop()?;
        o.write_struct_end()?;
        o.write_field_end()?;
        o.write_field_stop()?;
        o.write_struct_end()
    }
}
