//! Chat relays
//!
//! A [`ChatRelay`] joins the session store and the upstream provider. It has
//! two entry points:
//! - [`ChatRelay::send`] waits for the complete reply and returns it at once
//! - [`ChatRelay::stream`] returns the reply as client frames while it arrives
//!
//! Both append the user turn before calling upstream and commit the assistant
//! turn at most once per request.

mod buffered;
mod error;
pub mod stream;

pub use error::RelayError;
pub use stream::{FrameStream, RelayFrame, StreamState};

use std::sync::Arc;
use std::time::Duration;

use crate::session::SessionStore;
use crate::upstream::ChatProvider;

/// Shared relay state handed to every request
#[derive(Clone)]
pub struct ChatRelay {
    /// Conversation history per session
    store: Arc<dyn SessionStore>,
    /// Upstream language-model provider
    provider: Arc<dyn ChatProvider>,
    /// App identifier sent with every upstream request
    app_code: String,
    /// Longest wait for the next upstream chunk (None = wait forever)
    idle_timeout: Option<Duration>,
}

impl ChatRelay {
    /// Create a new relay
    pub fn new(
        store: Arc<dyn SessionStore>,
        provider: Arc<dyn ChatProvider>,
        app_code: impl Into<String>,
    ) -> Self {
        Self {
            store,
            provider,
            app_code: app_code.into(),
            idle_timeout: None,
        }
    }

    /// Set the idle timeout for the streamed read loop
    pub fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }
}
