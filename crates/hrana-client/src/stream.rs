//! Stream session.
//!
//! A [`Stream`] is a server-side SQL connection addressed through a chain of
//! batons. Every operation is one pipeline exchange: the stored baton is
//! attached to the request, and the baton and base URL carried by the
//! response are folded back into the stream before the outcome is examined.
//!
//! All operations take `&mut self`, so one stream never has two exchanges in
//! flight. Independent streams may run concurrently.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use hrana_protocol::{
    Batch, WireMessage, PipelineRequest, PipelineResponse, ProtocolError, StreamRequest,
    StreamResponse, StreamResult,
};

use crate::config::Config;
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::result::StatementResult;
use crate::state::StreamState;
use crate::statement::Statement;
use crate::transport::Transport;

/// A baton-addressed session on the server.
pub struct Stream {
    pipeline_url: String,
    credentials: Credentials,
    transport: Arc<dyn Transport>,
    baton: Option<String>,
    state: StreamState,
    request_timeout: Duration,
}

impl Stream {
    /// Create a fresh stream. No request is made until the first operation.
    pub fn new(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            pipeline_url: config.pipeline_url(),
            credentials: config.credentials.clone(),
            transport,
            baton: None,
            state: StreamState::Fresh,
            request_timeout: config.timeouts.request_timeout,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Check if the stream has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.state.is_open()
    }

    /// Baton to be attached to the next request, if any.
    #[must_use]
    pub fn baton(&self) -> Option<&str> {
        self.baton.as_deref()
    }

    /// URL the next request will be sent to.
    #[must_use]
    pub fn pipeline_url(&self) -> &str {
        &self.pipeline_url
    }

    /// Execute a single statement.
    ///
    /// A server-side failure is returned as [`Error::Statement`]; the stream
    /// stays usable.
    pub async fn execute(&mut self, statement: impl Into<Statement>) -> Result<StatementResult> {
        let timeout = self.request_timeout;
        self.execute_with_timeout(statement, timeout).await
    }

    /// Execute a single statement with an explicit deadline.
    ///
    /// On timeout the statement may or may not have been applied.
    pub async fn execute_with_timeout(
        &mut self,
        statement: impl Into<Statement>,
        timeout: Duration,
    ) -> Result<StatementResult> {
        let stmt = statement.into().into_stmt();
        tracing::debug!(sql = %stmt.sql, want_rows = stmt.want_rows, "executing statement");

        match self
            .request_one(StreamRequest::Execute(stmt), timeout)
            .await?
        {
            StreamResult::Ok(StreamResponse::Execute(result)) => Ok(result.into()),
            StreamResult::Ok(other) => Err(unexpected_response("execute", other.kind())),
            StreamResult::Error(error) => Err(Error::statement(error)),
            StreamResult::None => Err(unexpected_response("execute", "none")),
        }
    }

    /// Execute SQL statements as one unconditional batch.
    ///
    /// Each statement runs with rows not wanted. If any step fails the
    /// lowest failed step is reported as [`Error::Batch`]. An empty batch
    /// succeeds without contacting the server.
    pub async fn execute_batch<S: AsRef<str>>(&mut self, statements: &[S]) -> Result<()> {
        let timeout = self.request_timeout;
        self.execute_batch_with_timeout(statements, timeout).await
    }

    /// Execute SQL statements as one batch with an explicit deadline.
    pub async fn execute_batch_with_timeout<S: AsRef<str>>(
        &mut self,
        statements: &[S],
        timeout: Duration,
    ) -> Result<()> {
        if self.is_closed() {
            return Err(Error::StreamClosed);
        }
        if statements.is_empty() {
            tracing::debug!("empty batch, nothing to send");
            return Ok(());
        }

        let batch = Batch::from_sql(statements.iter().map(|s| <S as AsRef<str>>::as_ref(s)));
        tracing::debug!(steps = batch.steps.len(), "executing batch");

        match self
            .request_one(StreamRequest::Batch(batch), timeout)
            .await?
        {
            StreamResult::Ok(StreamResponse::Batch(result)) => match result.first_error() {
                Some((step, error)) => Err(Error::Batch {
                    step,
                    message: error.message.clone(),
                    code: error.code.clone(),
                }),
                None => Ok(()),
            },
            StreamResult::Ok(other) => Err(unexpected_response("batch", other.kind())),
            StreamResult::Error(error) => Err(Error::statement(error)),
            StreamResult::None => Err(unexpected_response("batch", "none")),
        }
    }

    /// Ask the server whether the stream is in autocommit mode.
    pub async fn get_autocommit(&mut self) -> Result<bool> {
        let timeout = self.request_timeout;
        self.get_autocommit_with_timeout(timeout).await
    }

    /// Ask the server for the autocommit flag with an explicit deadline.
    pub async fn get_autocommit_with_timeout(&mut self, timeout: Duration) -> Result<bool> {
        match self
            .request_one(StreamRequest::GetAutocommit, timeout)
            .await?
        {
            StreamResult::Ok(StreamResponse::GetAutocommit(flag)) => Ok(flag),
            StreamResult::Ok(other) => Err(unexpected_response("get_autocommit", other.kind())),
            StreamResult::Error(error) => Err(Error::statement(error)),
            StreamResult::None => Err(unexpected_response("get_autocommit", "none")),
        }
    }

    /// Close the stream.
    ///
    /// A stream the server never acknowledged is closed locally. Otherwise
    /// one close request is sent; the stream is closed whether or not that
    /// request succeeds, and its error (if any) is returned. Closing a closed
    /// stream does nothing.
    pub async fn close(&mut self) -> Result<()> {
        let timeout = self.request_timeout;
        self.close_with_timeout(timeout).await
    }

    /// Close the stream with an explicit deadline.
    pub async fn close_with_timeout(&mut self, timeout: Duration) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        self.state = StreamState::Closed;

        let Some(baton) = self.baton.take() else {
            tracing::debug!("closing stream without server-side state");
            return Ok(());
        };

        let result = self
            .exchange(Some(baton), vec![StreamRequest::Close], timeout)
            .await
            .and_then(|results| match single(results)? {
                StreamResult::Ok(StreamResponse::Close) => Ok(()),
                StreamResult::Ok(other) => Err(unexpected_response("close", other.kind())),
                StreamResult::Error(error) => Err(Error::statement(error)),
                StreamResult::None => Err(unexpected_response("close", "none")),
            });
        self.baton = None;

        if let Err(ref e) = result {
            tracing::warn!(error = %e, "failed to close stream");
        }
        result
    }

    /// Send one request on an open stream and return its outcome.
    async fn request_one(
        &mut self,
        request: StreamRequest,
        timeout: Duration,
    ) -> Result<StreamResult> {
        if self.is_closed() {
            return Err(Error::StreamClosed);
        }
        let baton = self.baton.clone();
        let results = self.exchange(baton, vec![request], timeout).await?;
        single(results)
    }

    /// Perform one pipeline exchange.
    ///
    /// Stream state is only touched once a well-formed response body has
    /// been received; a failed or timed-out exchange leaves the baton and
    /// URL as they were.
    async fn exchange(
        &mut self,
        baton: Option<String>,
        requests: Vec<StreamRequest>,
        timeout: Duration,
    ) -> Result<Vec<StreamResult>> {
        let expected = requests.len();
        tracing::debug!(
            requests = ?requests.iter().map(StreamRequest::kind).collect::<Vec<_>>(),
            baton = baton.is_some(),
            url = %self.pipeline_url,
            "sending pipeline request"
        );

        let body = PipelineRequest::new(baton, requests).encode();
        let send = self
            .transport
            .send(&self.pipeline_url, &self.credentials, body);
        let response = tokio::time::timeout(timeout, send)
            .await
            .map_err(|_| Error::RequestTimeout)??;

        let response = PipelineResponse::decode(response)?;
        let results = self.apply_response(response);
        tracing::debug!(
            results = results.len(),
            baton = self.baton.is_some(),
            "received pipeline response"
        );

        if results.len() != expected {
            return Err(ProtocolError::UnexpectedResultCount {
                expected,
                actual: results.len(),
            }
            .into());
        }
        Ok(results)
    }

    /// Fold the response baton and base URL into the stream.
    ///
    /// The first baton moves a fresh stream to [`StreamState::Active`].
    fn apply_response(&mut self, response: PipelineResponse) -> Vec<StreamResult> {
        if let Some(baton) = response.baton {
            self.baton = Some(baton);
            if self.state == StreamState::Fresh {
                self.state = StreamState::Active;
            }
        }
        if let Some(base_url) = response.base_url {
            let url = hrana_protocol::pipeline_url(&base_url);
            if url != self.pipeline_url {
                tracing::info!(from = %self.pipeline_url, to = %url, "pipeline URL redirected");
                self.pipeline_url = url;
            }
        }
        response.results
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("pipeline_url", &self.pipeline_url)
            .field("state", &self.state)
            .field("has_baton", &self.baton.is_some())
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

fn single(results: Vec<StreamResult>) -> Result<StreamResult> {
    let actual = results.len();
    let mut results = results.into_iter();
    match (results.next(), results.next()) {
        (Some(result), None) => Ok(result),
        _ => Err(ProtocolError::UnexpectedResultCount {
            expected: 1,
            actual,
        }
        .into()),
    }
}

fn unexpected_response(expected: &'static str, actual: &'static str) -> Error {
    ProtocolError::UnexpectedResponse { expected, actual }.into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;
    use hrana_protocol::{BatchResult, ServerError, StmtResult};

    use super::*;

    /// Replays scripted responses and records every request body.
    struct ScriptedTransport {
        responses: Mutex<VecDeque<std::result::Result<PipelineResponse, u16>>>,
        requests: Mutex<Vec<(String, PipelineRequest)>>,
    }

    impl ScriptedTransport {
        fn with(responses: Vec<std::result::Result<PipelineResponse, u16>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::default(),
            })
        }

        fn requests(&self) -> Vec<(String, PipelineRequest)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, url: &str, _: &Credentials, body: Bytes) -> Result<Bytes> {
            let request = PipelineRequest::decode(body).unwrap();
            self.requests.lock().unwrap().push((url.to_string(), request));
            match self.responses.lock().unwrap().pop_front().unwrap() {
                Ok(response) => Ok(response.encode()),
                Err(status) => Err(Error::Transport { status }),
            }
        }
    }

    struct StalledTransport;

    #[async_trait]
    impl Transport for StalledTransport {
        async fn send(&self, _: &str, _: &Credentials, _: Bytes) -> Result<Bytes> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Bytes::new())
        }
    }

    fn ok(baton: Option<&str>, response: StreamResponse) -> std::result::Result<PipelineResponse, u16> {
        Ok(PipelineResponse {
            baton: baton.map(String::from),
            base_url: None,
            results: vec![StreamResult::Ok(response)],
        })
    }

    fn stream(transport: Arc<dyn Transport>) -> Stream {
        Stream::new(&Config::new().base_url("http://db.test"), transport)
    }

    #[tokio::test]
    async fn test_baton_is_chained() {
        let transport = ScriptedTransport::with(vec![
            ok(Some("b1"), StreamResponse::Execute(StmtResult::default())),
            ok(Some("b2"), StreamResponse::GetAutocommit(true)),
        ]);
        let mut stream = stream(transport.clone());

        assert_eq!(stream.state(), StreamState::Fresh);
        stream.execute("SELECT 1").await.unwrap();
        assert_eq!(stream.state(), StreamState::Active);
        assert_eq!(stream.baton(), Some("b1"));
        assert!(stream.get_autocommit().await.unwrap());

        let requests = transport.requests();
        assert_eq!(requests[0].1.baton, None);
        assert_eq!(requests[1].1.baton.as_deref(), Some("b1"));
        assert_eq!(stream.baton(), Some("b2"));
    }

    #[tokio::test]
    async fn test_base_url_redirect() {
        let transport = ScriptedTransport::with(vec![
            Ok(PipelineResponse {
                baton: Some("b1".into()),
                base_url: Some("http://replica.test/".into()),
                results: vec![StreamResult::Ok(StreamResponse::Execute(
                    StmtResult::default(),
                ))],
            }),
            ok(Some("b2"), StreamResponse::Execute(StmtResult::default())),
        ]);
        let mut stream = stream(transport.clone());

        stream.execute("SELECT 1").await.unwrap();
        stream.execute("SELECT 2").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].0, "http://db.test/v3-protobuf/pipeline");
        assert_eq!(requests[1].0, "http://replica.test/v3-protobuf/pipeline");
    }

    #[tokio::test]
    async fn test_statement_error_keeps_stream_usable() {
        let transport = ScriptedTransport::with(vec![
            Ok(PipelineResponse {
                baton: Some("b1".into()),
                base_url: None,
                results: vec![StreamResult::Error(
                    ServerError::new("no such table: t").with_code("SQLITE_ERROR"),
                )],
            }),
            ok(Some("b2"), StreamResponse::Execute(StmtResult::default())),
        ]);
        let mut stream = stream(transport);

        let err = stream.execute("SELECT * FROM t").await.unwrap_err();
        assert!(matches!(err, Error::Statement { ref message, .. } if message == "no such table: t"));
        assert_eq!(err.server_code(), Some("SQLITE_ERROR"));
        assert_eq!(stream.baton(), Some("b1"));
        stream.execute("SELECT 1").await.unwrap();
    }

    #[tokio::test]
    async fn test_batch_reports_lowest_failed_step() {
        let mut result = BatchResult::default();
        result.step_results.insert(0, StmtResult::default());
        result.step_errors.insert(2, ServerError::new("third"));
        result.step_errors.insert(1, ServerError::new("second"));
        let transport = ScriptedTransport::with(vec![ok(Some("b1"), StreamResponse::Batch(result))]);
        let mut stream = stream(transport.clone());

        let err = stream
            .execute_batch(&["INSERT 1", "INSERT 2", "INSERT 3"])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Batch { step: 1, ref message, .. } if message == "second"));

        let StreamRequest::Batch(batch) = &transport.requests()[0].1.requests[0] else {
            unreachable!("batch request expected");
        };
        assert_eq!(batch.steps.len(), 3);
        assert!(batch.steps.iter().all(|s| !s.stmt.want_rows));
    }

    #[tokio::test]
    async fn test_empty_batch_is_local() {
        let transport = ScriptedTransport::with(vec![]);
        let mut stream = stream(transport.clone());

        stream.execute_batch::<&str>(&[]).await.unwrap();
        assert!(transport.requests().is_empty());
        assert_eq!(stream.state(), StreamState::Fresh);
    }

    #[tokio::test]
    async fn test_close_fresh_stream_sends_nothing() {
        let transport = ScriptedTransport::with(vec![]);
        let mut stream = stream(transport.clone());

        stream.close().await.unwrap();
        assert!(stream.is_closed());
        assert!(transport.requests().is_empty());
        assert!(matches!(stream.execute("SELECT 1").await, Err(Error::StreamClosed)));
    }

    #[tokio::test]
    async fn test_close_active_stream_once() {
        let transport = ScriptedTransport::with(vec![
            ok(Some("b1"), StreamResponse::Execute(StmtResult::default())),
            Err(503),
        ]);
        let mut stream = stream(transport.clone());
        stream.execute("SELECT 1").await.unwrap();

        let err = stream.close().await.unwrap_err();
        assert!(matches!(err, Error::Transport { status: 503 }));
        assert!(stream.is_closed());
        assert_eq!(stream.baton(), None);

        stream.close().await.unwrap();
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].1.baton.as_deref(), Some("b1"));
        assert_eq!(requests[1].1.requests, vec![StreamRequest::Close]);
    }

    #[tokio::test]
    async fn test_wrong_response_kind() {
        let transport = ScriptedTransport::with(vec![
            ok(Some("b1"), StreamResponse::Close),
            Ok(PipelineResponse {
                baton: Some("b2".into()),
                base_url: None,
                results: vec![StreamResult::None],
            }),
        ]);
        let mut stream = stream(transport);

        let err = stream.get_autocommit().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::UnexpectedResponse {
                expected: "get_autocommit",
                actual: "close"
            })
        ));
        let err = stream.execute("SELECT 1").await.unwrap_err();
        assert!(err.is_protocol_error());
        assert_eq!(stream.baton(), Some("b2"));
    }

    #[tokio::test]
    async fn test_result_count_mismatch() {
        let transport = ScriptedTransport::with(vec![Ok(PipelineResponse {
            baton: Some("b1".into()),
            base_url: None,
            results: vec![],
        })]);
        let mut stream = stream(transport);

        let err = stream.execute("SELECT 1").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::UnexpectedResultCount {
                expected: 1,
                actual: 0
            })
        ));
    }

    #[tokio::test]
    async fn test_response_without_baton_stays_fresh() {
        let transport = ScriptedTransport::with(vec![ok(
            None,
            StreamResponse::Execute(StmtResult::default()),
        )]);
        let mut stream = stream(transport.clone());

        stream.execute("SELECT 1").await.unwrap();
        assert_eq!(stream.state(), StreamState::Fresh);
        assert_eq!(stream.baton(), None);

        stream.close().await.unwrap();
        assert!(stream.is_closed());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_baton_on_count_mismatch_activates_stream() {
        let transport = ScriptedTransport::with(vec![
            Ok(PipelineResponse {
                baton: Some("b1".into()),
                base_url: None,
                results: vec![],
            }),
            ok(None, StreamResponse::Close),
        ]);
        let mut stream = stream(transport.clone());

        let err = stream.execute("SELECT 1").await.unwrap_err();
        assert!(err.is_protocol_error());
        assert_eq!(stream.state(), StreamState::Active);
        assert_eq!(stream.baton(), Some("b1"));

        stream.close().await.unwrap();
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].1.baton.as_deref(), Some("b1"));
        assert_eq!(requests[1].1.requests, vec![StreamRequest::Close]);
    }

    #[tokio::test]
    async fn test_transport_error_leaves_state() {
        let transport = ScriptedTransport::with(vec![Err(401)]);
        let mut stream = stream(transport);

        let err = stream.execute("SELECT 1").await.unwrap_err();
        assert!(matches!(err, Error::Transport { status: 401 }));
        assert_eq!(stream.state(), StreamState::Fresh);
        assert_eq!(stream.baton(), None);
    }

    #[tokio::test]
    async fn test_timeout() {
        let mut stream = stream(Arc::new(StalledTransport));

        let err = stream
            .execute_with_timeout("SELECT 1", Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RequestTimeout));
        assert!(err.is_ambiguous());
        assert_eq!(stream.state(), StreamState::Fresh);
        assert_eq!(stream.pipeline_url(), "http://db.test/v3-protobuf/pipeline");
    }
}
