//! Client configuration.

use std::time::Duration;

use reqwest::Url;

use crate::credentials::Credentials;
use crate::error::{Error, Result};

/// Environment variable consulted by [`Config::with_env_token`].
pub const TOKEN_ENV_VAR: &str = "HRANA_JWT";

/// Timeout configuration for HTTP exchanges.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Time to establish the TCP/TLS connection (default: 10s).
    pub connect_timeout: Duration,
    /// Default deadline for one pipeline exchange (default: 30s).
    pub request_timeout: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl TimeoutConfig {
    /// Create a new timeout configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the default request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the database, without the pipeline path.
    pub base_url: String,

    /// Authentication credentials.
    pub credentials: Credentials,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            credentials: Credentials::none(),
            timeouts: TimeoutConfig::default(),
            user_agent: concat!("hrana-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a database URL into configuration.
    ///
    /// Supports:
    /// ```text
    /// libsql://host[:port][/path][?jwt=TOKEN]
    /// https://host[:port][/path][?authToken=TOKEN]
    /// http://host[:port][/path]
    /// ```
    ///
    /// `libsql://` is served over HTTPS. The token is percent-decoded; `jwt`
    /// takes precedence over `authToken` when both are present.
    pub fn from_url(url: &str) -> Result<Self> {
        let parsed = Url::parse(url.trim())
            .map_err(|e| Error::Config(format!("invalid database URL: {e}")))?;

        let scheme = match parsed.scheme() {
            "libsql" | "https" => "https",
            "http" => "http",
            other => {
                return Err(Error::Config(format!("unsupported URL scheme: {other}")));
            }
        };

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::Config(format!("missing host in URL: {url}")))?;

        let mut base_url = format!("{scheme}://{host}");
        if let Some(port) = parsed.port() {
            base_url.push_str(&format!(":{port}"));
        }
        base_url.push_str(parsed.path().trim_end_matches('/'));

        let mut jwt = None;
        let mut auth_token = None;
        for (key, value) in parsed.query_pairs() {
            match key.as_ref() {
                "jwt" => jwt = Some(value.into_owned()),
                "authToken" => auth_token = Some(value.into_owned()),
                _ => {}
            }
        }

        let credentials = jwt
            .into_iter()
            .chain(auth_token)
            .find(|t| !t.is_empty())
            .map(Credentials::token)
            .unwrap_or_default();

        Ok(Self {
            base_url,
            credentials,
            ..Self::default()
        })
    }

    /// Fill a missing token from the `HRANA_JWT` environment variable.
    #[must_use]
    pub fn with_env_token(self) -> Self {
        let token = std::env::var(TOKEN_ENV_VAR).ok();
        self.with_fallback_token(token)
    }

    fn with_fallback_token(mut self, token: Option<String>) -> Self {
        if !self.credentials.has_token() {
            if let Some(token) = token.filter(|t| !t.is_empty()) {
                self.credentials = Credentials::token(token);
            }
        }
        self
    }

    /// Set the base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the credentials.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set the bearer token.
    #[must_use]
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.credentials = Credentials::token(token.into());
        self
    }

    /// Set the timeout configuration.
    #[must_use]
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connect_timeout = timeout;
        self
    }

    /// Set the default request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.request_timeout = timeout;
        self
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Full URL of the pipeline endpoint.
    #[must_use]
    pub fn pipeline_url(&self) -> String {
        hrana_protocol::pipeline_url(&self.base_url)
    }
}
