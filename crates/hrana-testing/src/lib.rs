//! # hrana-testing
//!
//! Test infrastructure for Hrana client development.
//!
//! This crate provides a mock libSQL server speaking the Hrana v3 protobuf
//! pipeline protocol, plus an in-process transport with identical behavior.
//!
//! ## Features
//!
//! - Mock Hrana server over real HTTP/1.1 (no database required)
//! - In-process `RecordingTransport` for socket-free tests
//! - Baton rotation and per-stream transaction tracking
//! - Request recording, including `Authorization` and media type headers
//!
//! ## Mock Server Example
//!
//! ```rust,ignore
//! use hrana_client::{Client, Config};
//! use hrana_testing::{MockColumn, MockHranaServer, MockResponse};
//! use hrana_protocol::Value;
//!
//! #[tokio::test]
//! async fn test_with_mock_server() {
//!     let server = MockHranaServer::builder()
//!         .with_response(
//!             "SELECT id, name FROM users",
//!             MockResponse::rows(
//!                 vec![MockColumn::integer("id"), MockColumn::text("name")],
//!                 vec![vec![Value::Integer(1), Value::Text("Alice".into())]],
//!             ),
//!         )
//!         .build()
//!         .await
//!         .unwrap();
//!
//!     let client = Client::new(Config::new().base_url(server.base_url())).unwrap();
//!     let mut conn = client.connect();
//!     let mut rs = conn.query("SELECT id, name FROM users", &[]).await.unwrap();
//!     assert!(rs.next());
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod engine;
pub mod mock_server;
pub mod recording;

pub use engine::RecordedRequest;
pub use mock_server::{
    MockColumn, MockHranaServer, MockResponse, MockServerBuilder, MockServerConfig,
    MockServerError,
};
pub use recording::RecordingTransport;
