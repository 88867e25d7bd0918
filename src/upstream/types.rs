//! Wire types for the provider's chat completion endpoint

use serde::{Deserialize, Serialize};

use crate::session::Turn;

/// Body posted to the provider
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamRequest {
    /// App identifier configured for this gateway
    pub app_code: String,
    /// Full history, including the user turn just appended
    pub messages: Vec<Turn>,
    /// Ask the provider for an SSE reply
    pub stream: bool,
}

impl UpstreamRequest {
    /// Request for a single buffered reply
    pub fn buffered(app_code: impl Into<String>, messages: Vec<Turn>) -> Self {
        Self {
            app_code: app_code.into(),
            messages,
            stream: false,
        }
    }

    /// Request for an SSE reply
    pub fn streamed(app_code: impl Into<String>, messages: Vec<Turn>) -> Self {
        Self {
            app_code: app_code.into(),
            messages,
            stream: true,
        }
    }
}

/// Buffered reply: `{"choices":[{"message":{"content":"..."}}]}`
///
/// Every level is optional so a reply missing the content can be reported as
/// malformed instead of failing deserialization outright.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    pub message: Option<CompletionMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionMessage {
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice, if present
    pub fn reply_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
    }
}

/// One streamed record: `{"choices":[{"delta":{"content":"..."}}]}`
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    pub delta: Option<ChunkDelta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkDelta {
    pub content: Option<serde_json::Value>,
}

impl CompletionChunk {
    /// Content fragment of the first choice
    ///
    /// Only string content counts as a fragment; role-only deltas and
    /// non-string content carry nothing to forward.
    pub fn fragment(self) -> Option<String> {
        match self.choices.into_iter().next()?.delta?.content? {
            serde_json::Value::String(text) => Some(text),
            _ => None,
        }
    }
}
