//! In-process transport backed by the mock engine.
//!
//! `RecordingTransport` answers exactly like [`crate::MockHranaServer`] but
//! without sockets, which keeps stream and transaction tests fast and
//! deterministic. Headers are recorded as the HTTP transport would send them.

use async_trait::async_trait;
use bytes::Bytes;
use hrana_client::{Credentials, Error, Transport};
use hrana_protocol::{PipelineRequest, WireMessage};

use crate::engine::{Engine, Outcome, RecordedRequest};

/// A [`Transport`] that runs requests through the mock engine and records
/// them.
#[derive(Clone)]
pub struct RecordingTransport {
    engine: Engine,
}

impl RecordingTransport {
    pub(crate) fn new(engine: Engine) -> Self {
        Self { engine }
    }

    /// All requests received so far, in arrival order.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.engine.requests().await
    }

    /// Number of exchanges performed.
    pub async fn request_count(&self) -> usize {
        self.engine.requests().await.len()
    }

    /// Number of streams currently holding a baton.
    pub async fn open_streams(&self) -> usize {
        self.engine.open_sessions().await
    }

    /// Answer subsequent requests with an HTTP status, or stop doing so.
    pub async fn set_http_status(&self, status: Option<u16>) {
        self.engine.set_http_status(status).await;
    }

    /// Attach a `base_url` to subsequent responses, or stop doing so.
    pub async fn set_base_url(&self, base_url: Option<String>) {
        self.engine.set_base_url(base_url).await;
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        url: &str,
        credentials: &Credentials,
        body: Bytes,
    ) -> hrana_client::Result<Bytes> {
        let request = RecordedRequest {
            target: url.to_string(),
            authorization: Some(credentials.bearer()),
            content_type: Some(hrana_protocol::CONTENT_TYPE.to_string()),
            accept: Some(hrana_protocol::CONTENT_TYPE.to_string()),
            body: PipelineRequest::decode(body)?,
        };

        match self.engine.handle(request).await {
            Outcome::Response(response) => Ok(response.encode()),
            Outcome::Status(status) => Err(Error::Transport { status }),
        }
    }
}
