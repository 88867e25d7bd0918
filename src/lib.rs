// HTTP Server modules
pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod sse;

// Conversation history
pub mod session;

// Upstream provider client
pub mod upstream;

// Buffered and streaming relays
pub mod relay;
