use crate::upstream::UpstreamError;

/// Errors that can occur while relaying a chat request
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Error from the upstream provider
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),
}

