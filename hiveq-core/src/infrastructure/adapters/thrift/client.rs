// hiveq-core/src/infrastructure/adapters/thrift/client.rs

use thrift::protocol::{
    TFieldIdentifier, TInputProtocol, TMessageIdentifier, TMessageType, TOutputProtocol,
    TStructIdentifier, TType, verify_expected_message_type, verify_expected_sequence_number,
    verify_expected_service_call,
};
use thrift::{ApplicationError, ApplicationErrorKind};

use super::messages::{
    ReadThrift, TCloseSessionReq, TExecuteStatementReq, TExecuteStatementResp, TFetchResultsReq,
    TFetchResultsResp, TGetResultSetMetadataResp, TOpenSessionReq, TOpenSessionResp,
    TOperationHandle, TOperationReq, TStatusResp, WriteThrift, next_field,
};

/// Synchronous TCLIService client over any pair of Thrift protocols.
pub struct TCliClient {
    input: Box<dyn TInputProtocol + Send>,
    output: Box<dyn TOutputProtocol + Send>,
    sequence: i32,
}

impl TCliClient {
    pub fn new(
        input: Box<dyn TInputProtocol + Send>,
        output: Box<dyn TOutputProtocol + Send>,
    ) -> Self {
        Self {
            input,
            output,
            sequence: 0,
        }
    }

    pub fn open_session(&mut self, req: &TOpenSessionReq) -> thrift::Result<TOpenSessionResp> {
        self.call("OpenSession", req)
    }

    pub fn execute_statement(
        &mut self,
        req: &TExecuteStatementReq,
    ) -> thrift::Result<TExecuteStatementResp> {
        self.call("ExecuteStatement", req)
    }

    pub fn get_result_set_metadata(
        &mut self,
        operation_handle: &TOperationHandle,
    ) -> thrift::Result<TGetResultSetMetadataResp> {
        let req = TOperationReq {
            struct_name: "TGetResultSetMetadataReq",
            operation_handle,
        };
        self.call("GetResultSetMetadata", &req)
    }

    pub fn fetch_results(&mut self, req: &TFetchResultsReq<'_>) -> thrift::Result<TFetchResultsResp> {
        self.call("FetchResults", req)
    }

    pub fn close_operation(
        &mut self,
        operation_handle: &TOperationHandle,
    ) -> thrift::Result<TStatusResp> {
        let req = TOperationReq {
            struct_name: "TCloseOperationReq",
            operation_handle,
        };
        self.call("CloseOperation", &req)
    }

    pub fn close_session(&mut self, req: &TCloseSessionReq<'_>) -> thrift::Result<TStatusResp> {
        self.call("CloseSession", req)
    }

    /// One request/reply round trip: `<method>_args { 1: req }` out,
    /// `<method>_result { 0: success }` back.
    fn call<Req, Resp>(&mut self, method: &str, req: &Req) -> thrift::Result<Resp>
    where
        Req: WriteThrift,
        Resp: ReadThrift,
    {
        self.sequence = self.sequence.wrapping_add(1);
        let sequence = self.sequence;

        let o = self.output.as_mut();
        o.write_message_begin(&TMessageIdentifier::new(method, TMessageType::Call, sequence))?;
        o.write_struct_begin(&TStructIdentifier::new(format!("{}_args", method)))?;
        o.write_field_begin(&TFieldIdentifier::new("req", TType::Struct, 1))?;
        req.write_to(o)?;
        o.write_field_end()?;
        o.write_field_stop()?;
        o.write_struct_end()?;
        o.write_message_end()?;
        o.flush()?;

        let i = self.input.as_mut();
        let reply = i.read_message_begin()?;
        if reply.message_type == TMessageType::Exception {
            let remote = thrift::Error::read_application_error_from_in_protocol(i)?;
            i.read_message_end()?;
            return Err(thrift::Error::Application(remote));
        }
        verify_expected_message_type(TMessageType::Reply, reply.message_type)?;
        verify_expected_service_call(method, &reply.name)?;
        verify_expected_sequence_number(sequence, reply.sequence_number)?;

        i.read_struct_begin()?;
        let mut success = None;
        while let Some((id, ty)) = next_field(i)? {
            if id == 0 && ty == TType::Struct {
                success = Some(Resp::read_from(i)?);
            } else {
                i.skip(ty)?;
            }
            i.read_field_end()?;
        }
        i.read_struct_end()?;
        i.read_message_end()?;

        success.ok_or_else(|| {
            thrift::Error::Application(ApplicationError::new(
                ApplicationErrorKind::MissingResult,
                format!("{} returned no result", method),
            ))
        })
    }
}
