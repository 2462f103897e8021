//! In-memory stream engine shared by the mock server and the recording
//! transport.
//!
//! The engine keeps one session per live baton. A request without a baton
//! opens a new session; a request with an unknown baton is rejected with
//! HTTP 400, as a real server does. Batons rotate on every response and
//! disappear once the stream is closed.

use std::collections::HashMap;
use std::sync::Arc;

use hrana_protocol::{
    Batch, BatchResult, PipelineRequest, PipelineResponse, ServerError, Stmt, StmtResult,
    StreamRequest, StreamResponse, StreamResult,
};
use tokio::sync::Mutex;

use crate::mock_server::{MockResponse, MockServerConfig, normalize_sql};

/// A pipeline request as observed by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request path (server) or full URL (transport).
    pub target: String,
    /// `Authorization` header value.
    pub authorization: Option<String>,
    /// `Content-Type` header value.
    pub content_type: Option<String>,
    /// `Accept` header value.
    pub accept: Option<String>,
    /// Decoded request body.
    pub body: PipelineRequest,
}

impl RecordedRequest {
    /// SQL text of every execute request and batch step, in order.
    #[must_use]
    pub fn sql(&self) -> Vec<&str> {
        let mut sql = Vec::new();
        for request in &self.body.requests {
            match request {
                StreamRequest::Execute(stmt) => sql.push(stmt.sql.as_str()),
                StreamRequest::Batch(batch) => {
                    sql.extend(batch.steps.iter().map(|s| s.stmt.sql.as_str()));
                }
                StreamRequest::Close | StreamRequest::GetAutocommit => {}
            }
        }
        sql
    }
}

/// Result of handling one exchange.
pub(crate) enum Outcome {
    Response(PipelineResponse),
    Status(u16),
}

#[derive(Debug)]
struct Session {
    autocommit: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self { autocommit: true }
    }
}

#[derive(Default)]
struct EngineState {
    sessions: HashMap<String, Session>,
    next_baton: u64,
    sessions_opened: usize,
    requests: Vec<RecordedRequest>,
    http_status: Option<u16>,
    base_url: Option<String>,
}

/// Shared engine; cheap to clone.
#[derive(Clone)]
pub(crate) struct Engine {
    config: Arc<MockServerConfig>,
    state: Arc<Mutex<EngineState>>,
}

impl Engine {
    pub(crate) fn new(config: MockServerConfig) -> Self {
        let state = EngineState {
            http_status: config.http_status,
            base_url: config.base_url.clone(),
            ..EngineState::default()
        };
        Self {
            config: Arc::new(config),
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub(crate) async fn handle(&self, request: RecordedRequest) -> Outcome {
        if let Some(delay) = self.config.delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().await;
        let body = request.body.clone();
        state.requests.push(request);

        if let Some(status) = state.http_status {
            return Outcome::Status(status);
        }
        if let Some(ref token) = self.config.auth_token {
            let expected = format!("Bearer {token}");
            let authorization = state.requests.last().and_then(|r| r.authorization.as_deref());
            if authorization != Some(expected.as_str()) {
                return Outcome::Status(401);
            }
        }

        let mut session = match body.baton {
            None => {
                state.sessions_opened += 1;
                Session::default()
            }
            Some(ref baton) => match state.sessions.remove(baton) {
                Some(session) => session,
                None => {
                    tracing::debug!(baton = %baton, "unknown baton");
                    return Outcome::Status(400);
                }
            },
        };

        let mut closed = false;
        let results = body
            .requests
            .iter()
            .map(|request| {
                if closed {
                    return StreamResult::Error(ServerError::new("stream is closed"));
                }
                match request {
                    StreamRequest::Close => {
                        closed = true;
                        StreamResult::Ok(StreamResponse::Close)
                    }
                    StreamRequest::Execute(stmt) => match self.execute(&mut session, stmt) {
                        Ok(result) => StreamResult::Ok(StreamResponse::Execute(result)),
                        Err(error) => StreamResult::Error(error),
                    },
                    StreamRequest::Batch(batch) => StreamResult::Ok(StreamResponse::Batch(
                        self.execute_batch(&mut session, batch),
                    )),
                    StreamRequest::GetAutocommit => {
                        StreamResult::Ok(StreamResponse::GetAutocommit(session.autocommit))
                    }
                }
            })
            .collect();

        let baton = if closed {
            None
        } else {
            state.next_baton += 1;
            let baton = format!("baton-{}", state.next_baton);
            state.sessions.insert(baton.clone(), session);
            Some(baton)
        };

        Outcome::Response(PipelineResponse {
            baton,
            base_url: state.base_url.clone(),
            results,
        })
    }

    fn execute(&self, session: &mut Session, stmt: &Stmt) -> Result<StmtResult, ServerError> {
        let sql = normalize_sql(&stmt.sql);
        let configured = self.config.responses.get(&sql);

        if let Some(MockResponse::Error { message, code }) = configured {
            return Err(error(message, code.as_deref()));
        }

        match sql.as_str() {
            "BEGIN" | "BEGIN TRANSACTION" | "BEGIN DEFERRED" | "BEGIN IMMEDIATE" => {
                if !session.autocommit {
                    return Err(error(
                        "cannot start a transaction within a transaction",
                        Some("SQLITE_ERROR"),
                    ));
                }
                session.autocommit = false;
            }
            "COMMIT" | "END" | "COMMIT TRANSACTION" | "END TRANSACTION" => {
                if session.autocommit {
                    return Err(error(
                        "cannot commit - no transaction is active",
                        Some("SQLITE_ERROR"),
                    ));
                }
                session.autocommit = true;
            }
            "ROLLBACK" | "ROLLBACK TRANSACTION" => {
                if session.autocommit {
                    return Err(error(
                        "cannot rollback - no transaction is active",
                        Some("SQLITE_ERROR"),
                    ));
                }
                session.autocommit = true;
            }
            _ => {}
        }

        configured
            .or(self.config.default_response.as_ref())
            .cloned()
            .unwrap_or_else(MockResponse::empty)
            .into_result(stmt)
    }

    fn execute_batch(&self, session: &mut Session, batch: &Batch) -> BatchResult {
        let mut result = BatchResult::default();
        for (index, step) in (0u32..).zip(&batch.steps) {
            match self.execute(session, &step.stmt) {
                Ok(step_result) => {
                    result.step_results.insert(index, step_result);
                }
                Err(step_error) => {
                    result.step_errors.insert(index, step_error);
                    break;
                }
            }
        }
        result
    }

    pub(crate) async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.requests.clone()
    }

    pub(crate) async fn open_sessions(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    pub(crate) async fn sessions_opened(&self) -> usize {
        self.state.lock().await.sessions_opened
    }

    pub(crate) async fn set_http_status(&self, status: Option<u16>) {
        self.state.lock().await.http_status = status;
    }

    pub(crate) async fn set_base_url(&self, base_url: Option<String>) {
        self.state.lock().await.base_url = base_url;
    }
}

fn error(message: &str, code: Option<&str>) -> ServerError {
    let error = ServerError::new(message);
    match code {
        Some(code) => error.with_code(code),
        None => error,
    }
}
