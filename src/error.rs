//! Error taxonomy for identifier resolution and media retrieval.
//!
//! Library code returns [`Result`]; the binary wraps these in `anyhow`.

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the resolver, the fetch strategies and the transport
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed identifier, short code or URL
    #[error("Invalid identifier: {0}")]
    Format(String),

    /// The platform has no media for this primary key
    #[error("Media {media_pk} not found")]
    MediaNotFound { media_pk: u64 },

    /// Transport-level 404 for an arbitrary endpoint
    #[error("Not found: {0}")]
    NotFound(String),

    /// The acting session lacks the privileges the endpoint needs
    #[error("Login required: {0}")]
    LoginRequired(String),

    /// A mutating operation was attempted without any session
    #[error("Login required: no authenticated session")]
    AuthRequired,

    /// Upstream rejected the request
    #[error("Request failed ({}): {message}", .status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// Connection, TLS or timeout failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response did not have the expected shape
    #[error("Unexpected response: {0}")]
    Extract(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this is a recognized client-level error.
    ///
    /// Anything else (malformed payloads, extraction failures) is treated as
    /// unexpected and gets logged before the fallback chain moves on.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Error::Extract(_) | Error::Json(_))
    }

    /// Whether the error signals absent content, for any endpoint
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::MediaNotFound { .. } | Error::NotFound(_))
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }

    pub(crate) fn extract(msg: impl Into<String>) -> Self {
        Error::Extract(msg.into())
    }
}
