//! HTTP transport binding.
//!
//! A [`Transport`] performs exactly one HTTP exchange per call: it POSTs an
//! encoded pipeline request and returns the raw response body. It knows
//! nothing about batons or streams; that state lives in [`crate::Stream`].

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};

use crate::config::Config;
use crate::credentials::Credentials;
use crate::error::{Error, Result};

/// A single request/response exchange with the pipeline endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `url` and return the response body.
    ///
    /// Implementations must send `Authorization: Bearer <token>` and the
    /// protobuf media type as both `Content-Type` and `Accept`, and must fail
    /// with [`Error::Transport`] on a non-2xx status without reading the body
    /// as a pipeline response.
    async fn send(&self, url: &str, credentials: &Credentials, body: Bytes) -> Result<Bytes>;
}

/// [`Transport`] backed by a shared `reqwest` client.
///
/// The underlying connection pool is reused across streams; HTTP/2 is
/// negotiated where the server supports it.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeouts.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing `reqwest` client.
    #[must_use]
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::RequestTimeout
    } else {
        Error::Http(err)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, url: &str, credentials: &Credentials, body: Bytes) -> Result<Bytes> {
        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, credentials.bearer())
            .header(CONTENT_TYPE, hrana_protocol::CONTENT_TYPE)
            .header(ACCEPT, hrana_protocol::CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), url = %url, "pipeline request rejected");
            return Err(Error::Transport {
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(map_reqwest_error)
    }
}
