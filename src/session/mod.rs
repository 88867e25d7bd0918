//! Per-session conversation history
//!
//! History lives only in process memory: sessions are created lazily on first
//! use, appended to by the relays, and dropped when the process exits. There is
//! no eviction, so the store grows for the lifetime of the process.

pub mod store;
pub mod types;

pub use store::{InMemorySessionStore, SessionStore};
pub use types::{Role, Turn};
