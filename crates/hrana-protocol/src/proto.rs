//! Wire messages of the Hrana v3 protobuf schema.
//!
//! These structs mirror `hrana.proto` field for field and are encoded with
//! [`prost`]. Application code works with the types re-exported from the
//! crate root, which convert to and from these through
//! [`WireMessage`](crate::WireMessage).
//!
//! Stream request and response kinds this client never issues (`sequence`,
//! `describe`, `store_sql`, `close_sql`) are declared with an [`Empty`]
//! payload so that their presence is still visible after decoding.

#![allow(missing_docs)]

use std::collections::BTreeMap;

use bytes::Bytes;

/// Message with no fields. Unknown fields inside it are skipped.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Empty {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Value {
    #[prost(oneof = "value::Value", tags = "1, 2, 3, 4, 5")]
    pub value: Option<value::Value>,
}

pub mod value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(message, tag = "1")]
        Null(super::Empty),
        #[prost(sint64, tag = "2")]
        Integer(i64),
        #[prost(double, tag = "3")]
        Float(f64),
        #[prost(string, tag = "4")]
        Text(String),
        #[prost(bytes = "bytes", tag = "5")]
        Blob(super::Bytes),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Error {
    #[prost(string, tag = "1")]
    pub message: String,
    #[prost(string, optional, tag = "2")]
    pub code: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NamedArg {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub value: Option<Value>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Stmt {
    #[prost(string, optional, tag = "1")]
    pub sql: Option<String>,
    #[prost(int32, optional, tag = "2")]
    pub sql_id: Option<i32>,
    #[prost(message, repeated, tag = "3")]
    pub args: Vec<Value>,
    #[prost(message, repeated, tag = "4")]
    pub named_args: Vec<NamedArg>,
    #[prost(bool, optional, tag = "5")]
    pub want_rows: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Col {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub decltype: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Row {
    #[prost(message, repeated, tag = "1")]
    pub values: Vec<Value>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StmtResult {
    #[prost(message, repeated, tag = "1")]
    pub cols: Vec<Col>,
    #[prost(message, repeated, tag = "2")]
    pub rows: Vec<Row>,
    #[prost(uint64, tag = "3")]
    pub affected_row_count: u64,
    #[prost(sint64, optional, tag = "4")]
    pub last_insert_rowid: Option<i64>,
}

/// Batch step. The `condition` field (tag 1) is never sent.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchStep {
    #[prost(message, optional, tag = "2")]
    pub stmt: Option<Stmt>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Batch {
    #[prost(message, repeated, tag = "1")]
    pub steps: Vec<BatchStep>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchResult {
    #[prost(btree_map = "uint32, message", tag = "1")]
    pub step_results: BTreeMap<u32, StmtResult>,
    #[prost(btree_map = "uint32, message", tag = "2")]
    pub step_errors: BTreeMap<u32, Error>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteStreamReq {
    #[prost(message, optional, tag = "1")]
    pub stmt: Option<Stmt>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteStreamResp {
    #[prost(message, optional, tag = "1")]
    pub result: Option<StmtResult>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchStreamReq {
    #[prost(message, optional, tag = "1")]
    pub batch: Option<Batch>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchStreamResp {
    #[prost(message, optional, tag = "1")]
    pub result: Option<BatchResult>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetAutocommitStreamResp {
    #[prost(bool, tag = "1")]
    pub is_autocommit: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamRequest {
    #[prost(oneof = "stream_request::Request", tags = "1, 2, 3, 4, 5, 6, 7, 8")]
    pub request: Option<stream_request::Request>,
}

pub mod stream_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Request {
        #[prost(message, tag = "1")]
        Close(super::Empty),
        #[prost(message, tag = "2")]
        Execute(super::ExecuteStreamReq),
        #[prost(message, tag = "3")]
        Batch(super::BatchStreamReq),
        #[prost(message, tag = "4")]
        Sequence(super::Empty),
        #[prost(message, tag = "5")]
        Describe(super::Empty),
        #[prost(message, tag = "6")]
        StoreSql(super::Empty),
        #[prost(message, tag = "7")]
        CloseSql(super::Empty),
        #[prost(message, tag = "8")]
        GetAutocommit(super::Empty),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamResponse {
    #[prost(oneof = "stream_response::Response", tags = "1, 2, 3, 4, 5, 6, 7, 8")]
    pub response: Option<stream_response::Response>,
}

pub mod stream_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Response {
        #[prost(message, tag = "1")]
        Close(super::Empty),
        #[prost(message, tag = "2")]
        Execute(super::ExecuteStreamResp),
        #[prost(message, tag = "3")]
        Batch(super::BatchStreamResp),
        #[prost(message, tag = "4")]
        Sequence(super::Empty),
        #[prost(message, tag = "5")]
        Describe(super::Empty),
        #[prost(message, tag = "6")]
        StoreSql(super::Empty),
        #[prost(message, tag = "7")]
        CloseSql(super::Empty),
        #[prost(message, tag = "8")]
        GetAutocommit(super::GetAutocommitStreamResp),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamResult {
    #[prost(oneof = "stream_result::Outcome", tags = "1, 2")]
    pub result: Option<stream_result::Outcome>,
}

pub mod stream_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Outcome {
        #[prost(message, tag = "1")]
        Ok(super::StreamResponse),
        #[prost(message, tag = "2")]
        Error(super::Error),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PipelineReqBody {
    #[prost(string, optional, tag = "1")]
    pub baton: Option<String>,
    #[prost(message, repeated, tag = "2")]
    pub requests: Vec<StreamRequest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PipelineRespBody {
    #[prost(string, optional, tag = "1")]
    pub baton: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub base_url: Option<String>,
    #[prost(message, repeated, tag = "3")]
    pub results: Vec<StreamResult>,
}
