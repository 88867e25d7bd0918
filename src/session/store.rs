//! Session store abstraction and its in-memory implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::types::Turn;

/// Narrow interface the relays use to read and write history
///
/// Callers always read the full history, append to it locally and write the
/// whole sequence back. There is no partial update.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Ordered history for `session_id`; empty for an unknown key
    async fn history(&self, session_id: &str) -> Vec<Turn>;

    /// Replace the stored history for `session_id`
    async fn append_and_save(&self, session_id: &str, history: Vec<Turn>);
}

/// Process-wide session map guarded by an async read/write lock
///
/// The lock is only held for the map lookup or insert itself, never across an
/// upstream call, so requests for different sessions never wait on each other
/// for longer than a hash map operation.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Vec<Turn>>>,
}

impl InMemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions seen so far
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn history(&self, session_id: &str) -> Vec<Turn> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn append_and_save(&self, session_id: &str, history: Vec<Turn>) {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), history);
    }
}
