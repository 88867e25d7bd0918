//! Server-Sent Events line splitting for streamed provider replies

use async_stream::stream;
use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;

use super::error::UpstreamError;
use super::provider::LineStream;

/// Prefix of an SSE line carrying a payload
const DATA_PREFIX: &str = "data:";

/// Accumulates raw bytes and hands out complete lines
///
/// Chunk boundaries from the transport do not line up with SSE records, so a
/// line left unterminated at the end of a chunk stays here until the rest of it
/// arrives. Bytes rather than text are buffered so a UTF-8 sequence split
/// across two chunks is decoded whole.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every line it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(end) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            lines.push(decode_line(&line[..end]));
        }
        lines
    }

    /// Take whatever is left once the transport has closed
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(decode_line(&rest))
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Split a byte stream into SSE lines
///
/// A transport error ends the line stream after yielding
/// `UpstreamError::Stream`. When the byte stream ends normally, an
/// unterminated trailing line is still yielded.
pub fn sse_lines<S, E>(byte_stream: S) -> LineStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    Box::pin(stream! {
        let mut byte_stream = Box::pin(byte_stream);
        let mut buffer = LineBuffer::new();

        while let Some(chunk) = byte_stream.next().await {
            match chunk {
                Ok(bytes) => {
                    for line in buffer.push(&bytes) {
                        yield Ok(line);
                    }
                }
                Err(e) => {
                    yield Err(UpstreamError::Stream(e.to_string()));
                    return;
                }
            }
        }

        if let Some(line) = buffer.finish() {
            yield Ok(line);
        }
    })
}

/// Payload of a `data:` line, trimmed; `None` for any other line
pub fn data_payload(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_PREFIX).map(str::trim)
}
