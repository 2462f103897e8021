//! Client entry point.

use std::sync::Arc;

use crate::config::Config;
use crate::connection::Connection;
use crate::error::Result;
use crate::stream::Stream;
use crate::transport::{HttpTransport, Transport};

/// Entry point for opening streams against one database.
///
/// A `Client` owns the configuration and a shared transport. Streams opened
/// from the same client reuse the transport's connection pool but share no
/// session state.
///
/// # Example
///
/// ```rust,ignore
/// use hrana_client::{Client, Config};
///
/// let client = Client::new(Config::from_url("libsql://db.example.com?jwt=TOKEN")?)?;
/// let mut conn = client.connect();
/// conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", &[]).await?;
/// conn.close().await?;
/// ```
#[derive(Clone)]
pub struct Client {
    config: Config,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Create a client using the HTTP transport.
    pub fn new(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        tracing::debug!(url = %config.pipeline_url(), "client created");
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client with a custom transport.
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Open a fresh stream. Nothing is sent until the first operation.
    #[must_use]
    pub fn open_stream(&self) -> Stream {
        Stream::new(&self.config, Arc::clone(&self.transport))
    }

    /// Open a connection on a fresh stream.
    #[must_use]
    pub fn connect(&self) -> Connection {
        Connection::new(self.open_stream())
    }

    /// Get the client configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
