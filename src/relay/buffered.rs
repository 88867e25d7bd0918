//! Request/response relay

use tracing::info;

use super::{ChatRelay, RelayError};
use crate::models::ChatReply;
use crate::session::Turn;
use crate::upstream::UpstreamRequest;

impl ChatRelay {
    /// Relay one message and wait for the complete reply
    ///
    /// The session history is written once on success and left untouched on
    /// any failure.
    pub async fn send(&self, message: &str, session_id: &str) -> Result<ChatReply, RelayError> {
        let mut history = self.store.history(session_id).await;
        history.push(Turn::user(message));

        let request = UpstreamRequest::buffered(self.app_code.clone(), history.clone());
        let reply = self.provider.send_buffered(request).await?;

        history.push(Turn::assistant(reply.clone()));
        let turns = history.len();
        self.store.append_and_save(session_id, history).await;
        info!(session_id, turns, "Committed buffered reply");

        Ok(ChatReply {
            response: reply,
            session_id: session_id.to_string(),
        })
    }
}
