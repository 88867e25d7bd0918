use crate::models::{StreamChunk, StreamErrorPayload};
use warp::sse::Event;

/// Literal data of the record that ends every client stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// warp writes `data:`/`event:` with no separator; clients match on `data: `
fn spaced(value: &str) -> String {
    format!(" {}", value)
}

/// Create a content SSE event carrying one fragment and the session id
pub fn create_content_event(chunk: &StreamChunk) -> Result<Event, std::convert::Infallible> {
    let data = serde_json::to_string(chunk).unwrap_or_else(|_| "{}".to_string());

    Ok(Event::default().data(spaced(&data)))
}

/// Create the `[DONE]` SSE event to signal stream completion
pub fn create_done_event() -> Result<Event, std::convert::Infallible> {
    Ok(Event::default().data(spaced(DONE_SENTINEL)))
}

/// Create an in-band `error` SSE event
pub fn create_error_event(message: &str) -> Result<Event, std::convert::Infallible> {
    let payload = StreamErrorPayload {
        message: message.to_string(),
    };
    let data = serde_json::to_string(&payload).unwrap_or_else(|_| "{}".to_string());

    Ok(Event::default().event(spaced("error")).data(spaced(&data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_event_wire_format() {
        let chunk = StreamChunk {
            content: "Hello".to_string(),
            session_id: "s1".to_string(),
        };
        let event = create_content_event(&chunk).unwrap();

        assert_eq!(
            event.to_string(),
            "data: {\"content\":\"Hello\",\"sessionId\":\"s1\"}\n\n"
        );
    }

    #[test]
    fn test_content_event_escapes_newlines() {
        let chunk = StreamChunk {
            content: "line one\nline two".to_string(),
            session_id: "s1".to_string(),
        };
        let event = create_content_event(&chunk).unwrap();

        // JSON encoding keeps the fragment on a single data line
        assert_eq!(
            event.to_string(),
            "data: {\"content\":\"line one\\nline two\",\"sessionId\":\"s1\"}\n\n"
        );
    }

    #[test]
    fn test_done_event_wire_format() {
        let event = create_done_event().unwrap();
        assert_eq!(event.to_string(), "data: [DONE]\n\n");
    }

    #[test]
    fn test_error_event_wire_format() {
        let event = create_error_event("Upstream API stream error").unwrap();
        assert_eq!(
            event.to_string(),
            "event: error\ndata: {\"message\":\"Upstream API stream error\"}\n\n"
        );
    }
}
