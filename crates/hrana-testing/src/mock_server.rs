//! Mock Hrana server for unit testing.
//!
//! This module provides a mock libSQL server that speaks the Hrana v3
//! protobuf pipeline protocol over plain HTTP/1.1 (served by `axum`), so the real
//! `reqwest`-based transport can be exercised without a database.
//!
//! ## Features
//!
//! - Baton issuance and rotation, one session per stream
//! - Configurable responses for SQL statements
//! - Transaction tracking (`BEGIN`/`COMMIT`/`ROLLBACK`) for autocommit queries
//! - Request recording, including headers
//! - Fault injection: HTTP status codes, `base_url` redirects, delays
//!
//! ## Example
//!
//! ```rust,ignore
//! use hrana_testing::mock_server::{MockHranaServer, MockResponse};
//!
//! #[tokio::test]
//! async fn test_query() {
//!     let server = MockHranaServer::builder()
//!         .with_response("SELECT 1", MockResponse::scalar("1", 1i64))
//!         .build()
//!         .await
//!         .unwrap();
//!
//!     let config = hrana_client::Config::new().base_url(server.base_url());
//!     // Connect your client to the server...
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use hrana_protocol::{
    Col, PIPELINE_PATH, PipelineRequest, Row, ServerError, Stmt, StmtResult, Value, WireMessage,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::engine::{Engine, Outcome, RecordedRequest};
use crate::recording::RecordingTransport;

/// Error type for mock server operations.
#[derive(Debug, Error)]
pub enum MockServerError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for mock server operations.
pub type Result<T> = std::result::Result<T, MockServerError>;

/// Mock response configuration.
#[derive(Clone)]
pub enum MockResponse {
    /// Return rows with columns.
    Rows {
        /// Column definitions.
        columns: Vec<MockColumn>,
        /// Row data.
        rows: Vec<Vec<Value>>,
    },

    /// Return an affected row count (for INSERT/UPDATE/DELETE).
    Affected {
        /// Number of changed rows.
        count: u64,
        /// Rowid of the last inserted row.
        last_insert_rowid: Option<i64>,
    },

    /// Fail the statement.
    Error {
        /// Error message.
        message: String,
        /// SQLite error code, e.g. `SQLITE_CONSTRAINT`.
        code: Option<String>,
    },

    /// Execute a custom handler.
    Custom(Arc<dyn Fn(&Stmt) -> MockResponse + Send + Sync>),
}

impl fmt::Debug for MockResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rows { columns, rows } => f
                .debug_struct("Rows")
                .field("columns", columns)
                .field("rows", rows)
                .finish(),
            Self::Affected {
                count,
                last_insert_rowid,
            } => f
                .debug_struct("Affected")
                .field("count", count)
                .field("last_insert_rowid", last_insert_rowid)
                .finish(),
            Self::Error { message, code } => f
                .debug_struct("Error")
                .field("message", message)
                .field("code", code)
                .finish(),
            Self::Custom(_) => f.debug_tuple("Custom").field(&"<fn>").finish(),
        }
    }
}

impl MockResponse {
    /// Create a single-row, single-column response.
    pub fn scalar(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::rows(vec![MockColumn::new(column)], vec![vec![value.into()]])
    }

    /// Create a rows response.
    pub fn rows(columns: Vec<MockColumn>, rows: Vec<Vec<Value>>) -> Self {
        Self::Rows { columns, rows }
    }

    /// Create an empty result response.
    pub fn empty() -> Self {
        Self::affected(0)
    }

    /// Create a rows-affected response.
    pub fn affected(count: u64) -> Self {
        Self::Affected {
            count,
            last_insert_rowid: None,
        }
    }

    /// Create a single-row insert response.
    pub fn inserted(rowid: i64) -> Self {
        Self::Affected {
            count: 1,
            last_insert_rowid: Some(rowid),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            code: None,
        }
    }

    /// Create an error response with an error code.
    pub fn error_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Create a response computed from the statement.
    pub fn custom<F>(handler: F) -> Self
    where
        F: Fn(&Stmt) -> MockResponse + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(handler))
    }

    pub(crate) fn into_result(self, stmt: &Stmt) -> std::result::Result<StmtResult, ServerError> {
        match self {
            Self::Rows { columns, rows } => Ok(StmtResult {
                cols: columns.into_iter().map(MockColumn::into_col).collect(),
                rows: if stmt.want_rows {
                    rows.into_iter().map(|values| Row { values }).collect()
                } else {
                    Vec::new()
                },
                affected_row_count: 0,
                last_insert_rowid: None,
            }),
            Self::Affected {
                count,
                last_insert_rowid,
            } => Ok(StmtResult {
                affected_row_count: count,
                last_insert_rowid,
                ..StmtResult::default()
            }),
            Self::Error { message, code } => Err(ServerError { message, code }),
            Self::Custom(handler) => handler(stmt).into_result(stmt),
        }
    }
}

/// Mock column definition.
#[derive(Debug, Clone)]
pub struct MockColumn {
    /// Column name.
    pub name: String,
    /// Declared type.
    pub decltype: Option<String>,
}

impl MockColumn {
    /// Create a column without a declared type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decltype: None,
        }
    }

    /// Create an INTEGER column.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name).with_decltype("INTEGER")
    }

    /// Create a TEXT column.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name).with_decltype("TEXT")
    }

    /// Set the declared type.
    #[must_use]
    pub fn with_decltype(mut self, decltype: impl Into<String>) -> Self {
        self.decltype = Some(decltype.into());
        self
    }

    fn into_col(self) -> Col {
        Col {
            name: Some(self.name),
            decltype: self.decltype,
        }
    }
}

/// Normalize SQL text for response matching.
pub(crate) fn normalize_sql(sql: &str) -> String {
    sql.trim()
        .trim_end_matches(';')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Configuration for the mock server.
#[derive(Default)]
pub struct MockServerConfig {
    /// Pre-configured responses keyed by normalized SQL.
    pub(crate) responses: HashMap<String, MockResponse>,
    /// Default response for unmatched statements.
    pub(crate) default_response: Option<MockResponse>,
    /// Answer every request with this HTTP status.
    pub(crate) http_status: Option<u16>,
    /// `base_url` attached to every response.
    pub(crate) base_url: Option<String>,
    /// Delay before each response.
    pub(crate) delay: Option<Duration>,
    /// Token required in the `Authorization` header.
    pub(crate) auth_token: Option<String>,
}

/// Builder for `MockHranaServer` and `RecordingTransport`.
#[derive(Default)]
pub struct MockServerBuilder {
    config: MockServerConfig,
}

impl MockServerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response for a specific SQL statement.
    ///
    /// Matching ignores case, surrounding whitespace and a trailing `;`.
    #[must_use]
    pub fn with_response(mut self, sql: impl AsRef<str>, response: MockResponse) -> Self {
        self.config
            .responses
            .insert(normalize_sql(sql.as_ref()), response);
        self
    }

    /// Set the default response for unmatched statements.
    #[must_use]
    pub fn with_default_response(mut self, response: MockResponse) -> Self {
        self.config.default_response = Some(response);
        self
    }

    /// Answer every request with an HTTP status instead of a pipeline response.
    #[must_use]
    pub fn with_http_status(mut self, status: u16) -> Self {
        self.config.http_status = Some(status);
        self
    }

    /// Attach a `base_url` to every response.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Delay every response.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.config.delay = Some(delay);
        self
    }

    /// Require `Authorization: Bearer <token>`; other requests get 401.
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.config.auth_token = Some(token.into());
        self
    }

    /// Build and start the mock server.
    pub async fn build(self) -> Result<MockHranaServer> {
        MockHranaServer::start(self.config).await
    }

    /// Build an in-process transport with the same behavior.
    #[must_use]
    pub fn build_transport(self) -> RecordingTransport {
        RecordingTransport::new(Engine::new(self.config))
    }
}

/// A mock Hrana server for testing.
///
/// The server listens on an ephemeral port on `127.0.0.1` and accepts any
/// request path ending in `/v3-protobuf/pipeline`, so redirects to a path
/// prefix of the same server can be tested.
pub struct MockHranaServer {
    /// Server address.
    addr: SocketAddr,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
    /// Session engine.
    engine: Engine,
}

impl MockHranaServer {
    /// Create a new builder for the mock server.
    pub fn builder() -> MockServerBuilder {
        MockServerBuilder::new()
    }

    /// Start the mock server on an available port.
    pub async fn start(config: MockServerConfig) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        let engine = Engine::new(config);

        let app = Router::new()
            .fallback(handle_pipeline)
            .with_state(engine.clone());

        tokio::spawn(async move {
            let shutdown = async move {
                let _ = shutdown_rx.recv().await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!("mock server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            shutdown_tx,
            engine,
        })
    }

    /// Get the server's listening address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get the port number.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Base URL for client configuration, e.g. `http://127.0.0.1:34567`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// All requests received so far, in arrival order.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.engine.requests().await
    }

    /// Number of streams currently holding a baton.
    pub async fn open_streams(&self) -> usize {
        self.engine.open_sessions().await
    }

    /// Number of streams opened since the server started.
    pub async fn streams_opened(&self) -> usize {
        self.engine.sessions_opened().await
    }

    /// Answer subsequent requests with an HTTP status, or stop doing so.
    pub async fn set_http_status(&self, status: Option<u16>) {
        self.engine.set_http_status(status).await;
    }

    /// Attach a `base_url` to subsequent responses, or stop doing so.
    pub async fn set_base_url(&self, base_url: Option<String>) {
        self.engine.set_base_url(base_url).await;
    }

    /// Stop the server.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

impl Drop for MockHranaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(String::from)
}

/// Answer one HTTP request.
async fn handle_pipeline(
    State(engine): State<Engine>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    if !uri.path().ends_with(PIPELINE_PATH) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let body = match PipelineRequest::decode(body) {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(error = %e, "malformed pipeline request");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let recorded = RecordedRequest {
        target: uri.path().to_string(),
        authorization: header_value(&headers, header::AUTHORIZATION),
        content_type: header_value(&headers, header::CONTENT_TYPE),
        accept: header_value(&headers, header::ACCEPT),
        body,
    };

    match engine.handle(recorded).await {
        Outcome::Response(response) => (
            [(header::CONTENT_TYPE, hrana_protocol::CONTENT_TYPE)],
            response.encode(),
        )
            .into_response(),
        Outcome::Status(status) => StatusCode::from_u16(status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_starts() {
        let server = MockHranaServer::builder().build().await.unwrap();

        assert!(server.port() > 0);
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
        assert!(server.base_url().starts_with("http://127.0.0.1:"));
        assert_eq!(server.streams_opened().await, 0);
    }

    #[tokio::test]
    async fn test_rejects_non_pipeline_requests() {
        let server = MockHranaServer::builder().build().await.unwrap();
        let client = reqwest::Client::new();
        let url = format!("{}{}", server.base_url(), PIPELINE_PATH);

        let response = client.get(&url).send().await.unwrap();
        assert_eq!(response.status(), 405);

        let response = client
            .post(format!("{}/v2/pipeline", server.base_url()))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 404);

        let response = client
            .post(&url)
            .body(vec![0x12, 0x05, 0x01])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
        assert!(server.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_records_headers_from_header_map() {
        let server = MockHranaServer::builder().build().await.unwrap();
        let body = PipelineRequest::new(None, vec![hrana_protocol::StreamRequest::Close]).encode();

        let response = reqwest::Client::new()
            .post(format!("{}/db{}", server.base_url(), PIPELINE_PATH))
            .header("Authorization", "Bearer abc")
            .header("Content-Type", hrana_protocol::CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["content-type"],
            hrana_protocol::CONTENT_TYPE
        );

        let requests = server.requests().await;
        assert_eq!(requests[0].target, "/db/v3-protobuf/pipeline");
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer abc"));
        assert_eq!(
            requests[0].content_type.as_deref(),
            Some(hrana_protocol::CONTENT_TYPE)
        );
        assert_eq!(requests[0].accept, None);
    }

    #[test]
    fn test_normalize_sql() {
        assert_eq!(normalize_sql("  select\n  1 ; "), "SELECT 1");
        assert_eq!(normalize_sql("commit;"), "COMMIT");
    }

    #[test]
    fn test_rows_respect_want_rows() {
        let response = MockResponse::scalar("n", 1i64);

        let result = response.clone().into_result(&Stmt::new("SELECT 1", true)).unwrap();
        assert_eq!(result.cols.len(), 1);
        assert_eq!(result.rows.len(), 1);

        let result = response.into_result(&Stmt::new("SELECT 1", false)).unwrap();
        assert_eq!(result.cols.len(), 1);
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_custom_response_sees_args() {
        let response = MockResponse::custom(|stmt| match stmt.args.first() {
            Some(Value::Integer(id)) => MockResponse::inserted(*id),
            _ => MockResponse::error("missing id"),
        });

        let mut stmt = Stmt::new("INSERT INTO t VALUES (?)", false);
        stmt.args.push(Value::Integer(9));
        let result = response.clone().into_result(&stmt).unwrap();
        assert_eq!(result.last_insert_rowid, Some(9));

        let err = response
            .into_result(&Stmt::new("INSERT INTO t VALUES (?)", false))
            .unwrap_err();
        assert_eq!(err.message, "missing id");
    }
}
