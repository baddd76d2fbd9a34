//! Construction errors for the HTTP clients

use thiserror::Error;

/// Errors raised while building a client, before any request is sent
#[derive(Error, Debug)]
pub enum ClientError {
    /// Base URL does not parse
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// reqwest refused the builder configuration (TLS backend, ...)
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Build(err.to_string())
    }
}
