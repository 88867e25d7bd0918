//! Provider trait the relays depend on

use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;

use super::{error::UpstreamError, types::UpstreamRequest};

/// Raw SSE lines of a streamed reply, in arrival order
///
/// Each item is one complete line with its terminator removed. A transport
/// failure after the stream started surfaces as `Err(UpstreamError::Stream)`.
pub type LineStream = Pin<Box<dyn Stream<Item = Result<String, UpstreamError>> + Send>>;

/// Interface every upstream provider implementation must satisfy
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send the conversation and wait for the complete reply text
    async fn send_buffered(&self, request: UpstreamRequest) -> Result<String, UpstreamError>;

    /// Send the conversation and return the reply as a lazy stream of SSE lines
    ///
    /// Errors returned here happened before any part of the reply arrived.
    async fn send_streamed(&self, request: UpstreamRequest) -> Result<LineStream, UpstreamError>;
}
