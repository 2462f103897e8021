//! Pipeline envelopes and stream requests.
//!
//! Every HTTP exchange carries one [`PipelineRequest`] and receives one
//! [`PipelineResponse`]. The baton ties consecutive exchanges to the same
//! server-side stream; the base URL, when present, redirects subsequent
//! exchanges to another endpoint.

use crate::batch::{Batch, BatchResult};
use crate::codec::{WireMessage, from_protos, required, to_protos};
use crate::error::ProtocolError;
use crate::proto::{self, stream_request, stream_response, stream_result};
use crate::stmt::{ServerError, Stmt, StmtResult};

/// Path appended to the base URL to reach the protobuf pipeline endpoint.
pub const PIPELINE_PATH: &str = "/v3-protobuf/pipeline";

/// Media type for request and response bodies.
pub const CONTENT_TYPE: &str = "application/x-protobuf";

/// Build the pipeline URL for a base URL.
///
/// Trailing slashes on the base are dropped so the path is never doubled.
#[must_use]
pub fn pipeline_url(base_url: &str) -> String {
    format!("{}{PIPELINE_PATH}", base_url.trim_end_matches('/'))
}

/// One operation within a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamRequest {
    /// Close the stream. `close = 1`
    Close,
    /// Execute a statement. `execute = 2`
    Execute(Stmt),
    /// Execute a batch. `batch = 3`
    Batch(Batch),
    /// Query the autocommit flag. `get_autocommit = 8`
    GetAutocommit,
}

impl StreamRequest {
    /// Name of the request kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::Execute(_) => "execute",
            Self::Batch(_) => "batch",
            Self::GetAutocommit => "get_autocommit",
        }
    }
}

impl WireMessage for StreamRequest {
    type Proto = proto::StreamRequest;

    fn to_proto(&self) -> proto::StreamRequest {
        use stream_request::Request;

        let request = match self {
            Self::Close => Request::Close(proto::Empty {}),
            Self::Execute(stmt) => Request::Execute(proto::ExecuteStreamReq {
                stmt: Some(stmt.to_proto()),
            }),
            Self::Batch(batch) => Request::Batch(proto::BatchStreamReq {
                batch: Some(batch.to_proto()),
            }),
            Self::GetAutocommit => Request::GetAutocommit(proto::Empty {}),
        };
        proto::StreamRequest {
            request: Some(request),
        }
    }

    fn from_proto(proto: proto::StreamRequest) -> Result<Self, ProtocolError> {
        use stream_request::Request;

        match required(proto.request, "StreamRequest.request")? {
            Request::Close(_) => Ok(Self::Close),
            Request::Execute(req) => Ok(Self::Execute(Stmt::from_proto(required(
                req.stmt,
                "ExecuteStreamReq.stmt",
            )?)?)),
            Request::Batch(req) => Ok(Self::Batch(Batch::from_proto(required(
                req.batch,
                "BatchStreamReq.batch",
            )?)?)),
            Request::GetAutocommit(_) => Ok(Self::GetAutocommit),
            Request::Sequence(_) => Err(ProtocolError::UnknownRequestKind(4)),
            Request::Describe(_) => Err(ProtocolError::UnknownRequestKind(5)),
            Request::StoreSql(_) => Err(ProtocolError::UnknownRequestKind(6)),
            Request::CloseSql(_) => Err(ProtocolError::UnknownRequestKind(7)),
        }
    }
}

/// Payload of a successful stream request.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamResponse {
    /// Stream closed. `close = 1`
    Close,
    /// Statement result. `execute = 2`
    Execute(StmtResult),
    /// Batch result. `batch = 3`
    Batch(BatchResult),
    /// Autocommit flag. `get_autocommit = 8`
    GetAutocommit(bool),
    /// A response kind this client never requests (`sequence`, `describe`,
    /// `store_sql` or `close_sql`), identified by field number.
    Other(u32),
}

impl StreamResponse {
    /// Name of the response kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::Execute(_) => "execute",
            Self::Batch(_) => "batch",
            Self::GetAutocommit(_) => "get_autocommit",
            Self::Other(_) => "other",
        }
    }
}

impl WireMessage for StreamResponse {
    type Proto = proto::StreamResponse;

    fn to_proto(&self) -> proto::StreamResponse {
        use stream_response::Response;

        let response = match self {
            Self::Close => Some(Response::Close(proto::Empty {})),
            Self::Execute(result) => Some(Response::Execute(proto::ExecuteStreamResp {
                result: Some(result.to_proto()),
            })),
            Self::Batch(result) => Some(Response::Batch(proto::BatchStreamResp {
                result: Some(result.to_proto()),
            })),
            Self::GetAutocommit(is_autocommit) => {
                Some(Response::GetAutocommit(proto::GetAutocommitStreamResp {
                    is_autocommit: *is_autocommit,
                }))
            }
            Self::Other(4) => Some(Response::Sequence(proto::Empty {})),
            Self::Other(5) => Some(Response::Describe(proto::Empty {})),
            Self::Other(6) => Some(Response::StoreSql(proto::Empty {})),
            Self::Other(7) => Some(Response::CloseSql(proto::Empty {})),
            Self::Other(_) => None,
        };
        proto::StreamResponse { response }
    }

    fn from_proto(proto: proto::StreamResponse) -> Result<Self, ProtocolError> {
        use stream_response::Response;

        Ok(match required(proto.response, "StreamResponse.response")? {
            Response::Close(_) => Self::Close,
            Response::Execute(resp) => Self::Execute(StmtResult::from_proto(required(
                resp.result,
                "ExecuteStreamResp.result",
            )?)?),
            Response::Batch(resp) => Self::Batch(BatchResult::from_proto(required(
                resp.result,
                "BatchStreamResp.result",
            )?)?),
            Response::GetAutocommit(resp) => Self::GetAutocommit(resp.is_autocommit),
            Response::Sequence(_) => Self::Other(4),
            Response::Describe(_) => Self::Other(5),
            Response::StoreSql(_) => Self::Other(6),
            Response::CloseSql(_) => Self::Other(7),
        })
    }
}

/// Outcome of one stream request.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamResult {
    /// The request succeeded. `ok = 1`
    Ok(StreamResponse),
    /// The request failed. `error = 2`
    Error(ServerError),
    /// Neither member was set.
    None,
}

impl WireMessage for StreamResult {
    type Proto = proto::StreamResult;

    fn to_proto(&self) -> proto::StreamResult {
        use stream_result::Outcome;

        let result = match self {
            Self::Ok(response) => Some(Outcome::Ok(response.to_proto())),
            Self::Error(error) => Some(Outcome::Error(error.to_proto())),
            Self::None => None,
        };
        proto::StreamResult { result }
    }

    fn from_proto(proto: proto::StreamResult) -> Result<Self, ProtocolError> {
        use stream_result::Outcome;

        Ok(match proto.result {
            Some(Outcome::Ok(response)) => Self::Ok(StreamResponse::from_proto(response)?),
            Some(Outcome::Error(error)) => Self::Error(ServerError::from_proto(error)?),
            None => Self::None,
        })
    }
}

/// Body of a pipeline request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineRequest {
    /// Baton from the previous response; absent on the first exchange.
    pub baton: Option<String>,
    /// Requests executed in order.
    pub requests: Vec<StreamRequest>,
}

impl PipelineRequest {
    /// Create a request body.
    pub fn new(baton: Option<String>, requests: Vec<StreamRequest>) -> Self {
        Self { baton, requests }
    }
}

impl WireMessage for PipelineRequest {
    type Proto = proto::PipelineReqBody;

    fn to_proto(&self) -> proto::PipelineReqBody {
        proto::PipelineReqBody {
            baton: self.baton.clone(),
            requests: to_protos(&self.requests),
        }
    }

    fn from_proto(proto: proto::PipelineReqBody) -> Result<Self, ProtocolError> {
        Ok(Self {
            baton: proto.baton,
            requests: from_protos(proto.requests)?,
        })
    }
}

/// Body of a pipeline response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineResponse {
    /// Baton for the next exchange. Absent when the server closed the stream.
    pub baton: Option<String>,
    /// Base URL for subsequent exchanges, if the server redirects.
    pub base_url: Option<String>,
    /// One result per request, in request order.
    pub results: Vec<StreamResult>,
}

impl WireMessage for PipelineResponse {
    type Proto = proto::PipelineRespBody;

    fn to_proto(&self) -> proto::PipelineRespBody {
        proto::PipelineRespBody {
            baton: self.baton.clone(),
            base_url: self.base_url.clone(),
            results: to_protos(&self.results),
        }
    }

    fn from_proto(proto: proto::PipelineRespBody) -> Result<Self, ProtocolError> {
        Ok(Self {
            baton: proto.baton,
            base_url: proto.base_url,
            results: from_protos(proto.results)?,
        })
    }
}
