//! # hrana-protocol
//!
//! Pure implementation of the Hrana v3 protobuf messages used by libSQL
//! remote streams over HTTP.
//!
//! This crate provides the value, statement, batch and pipeline messages.
//! Their protobuf encoding is derived with `prost` from the wire structs in
//! [`proto`]; the types re-exported here convert to and from those through
//! [`WireMessage`], which also enforces fields the protocol requires.
//!
//! ## Design Philosophy
//!
//! This crate is intentionally IO-agnostic. It contains no networking logic and
//! makes no assumptions about the async runtime. Higher-level crates build upon
//! this foundation to provide HTTP transport and stream session management.
//!
//! ## Example
//!
//! ```rust
//! use hrana_protocol::{PipelineRequest, PipelineResponse, Stmt, StreamRequest, WireMessage};
//!
//! let body = PipelineRequest::new(
//!     None,
//!     vec![StreamRequest::Execute(Stmt::new("SELECT 1", true))],
//! );
//! let encoded = body.encode();
//! assert!(!encoded.is_empty());
//!
//! let response = PipelineResponse::decode(bytes::Bytes::new()).unwrap();
//! assert!(response.results.is_empty());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod batch;
pub mod codec;
pub mod error;
pub mod pipeline;
pub mod proto;
pub mod stmt;
pub mod value;

pub use batch::{Batch, BatchResult, BatchStep};
pub use codec::WireMessage;
pub use error::ProtocolError;
pub use pipeline::{
    CONTENT_TYPE, PIPELINE_PATH, PipelineRequest, PipelineResponse, StreamRequest,
    StreamResponse, StreamResult, pipeline_url,
};
pub use stmt::{Col, NamedArg, Row, ServerError, Stmt, StmtResult};
pub use value::Value;
