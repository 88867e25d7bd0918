//! Error types for the upstream client

use thiserror::Error;

/// Errors that can occur when talking to the provider
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection could not be established or the request never completed
    #[error("Upstream unreachable: {0}")]
    Unreachable(String),

    /// Provider answered with a non-success status
    #[error("HTTP error (status {status}): {body}")]
    Http { status: u16, body: String },

    /// A stream payload could not be parsed
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Transport failure after the stream started
    #[error("Stream error: {0}")]
    Stream(String),

    /// Buffered reply without the expected reply field
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => UpstreamError::Http {
                status: status.as_u16(),
                body: err.to_string(),
            },
            None => UpstreamError::Unreachable(err.to_string()),
        }
    }
}
