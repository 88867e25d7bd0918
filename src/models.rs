// Client-facing request and response bodies

use serde::{Deserialize, Serialize};

// Request body for both chat routes
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

// Buffered reply
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

// Payload of one streamed content event
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StreamChunk {
    pub content: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

// Payload of the in-band `error` event
#[derive(Debug, Clone, Serialize)]
pub struct StreamErrorPayload {
    pub message: String,
}

// Body of every buffered error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
