//! Upstream language-model provider client
//!
//! The relays talk to the provider only through the [`ChatProvider`] trait.
//! [`LinkAiClient`] is the HTTP implementation: it posts the conversation as
//! JSON and either reads one buffered reply or hands back the raw SSE lines of
//! a streamed reply.

pub mod client;
pub mod error;
pub mod provider;
pub mod sse;
pub mod types;

// Re-export commonly used types
pub use client::LinkAiClient;
pub use error::UpstreamError;
pub use provider::{ChatProvider, LineStream};
pub use types::UpstreamRequest;
