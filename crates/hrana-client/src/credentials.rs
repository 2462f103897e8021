//! Credential types for authentication.

use std::borrow::Cow;

/// Bearer-token credentials for the pipeline endpoint.
///
/// Credentials are designed to minimize copying of sensitive data, and the
/// token never appears in debug output.
#[derive(Clone, Default)]
pub struct Credentials {
    token: Option<Cow<'static, str>>,
}

impl Credentials {
    /// Credentials without a token.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Credentials carrying a JWT.
    pub fn token(token: impl Into<Cow<'static, str>>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Check if a token is present.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Value of the `Authorization` header.
    ///
    /// Servers without authentication accept an empty bearer token, so the
    /// header is sent even when no token is configured.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token.as_deref().unwrap_or_default())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose sensitive data in debug output
        let token = if self.token.is_some() {
            "[REDACTED]"
        } else {
            "None"
        };
        f.debug_struct("Credentials").field("token", &token).finish()
    }
}
