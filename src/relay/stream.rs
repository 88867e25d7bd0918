//! Streaming relay
//!
//! The upstream reply arrives as SSE lines. Each line goes through a
//! [`StreamSession`], which tracks the stream state and the accumulated reply:
//!
//! ```text
//! STREAMING --[DONE] sentinel / upstream closed--> DONE
//! STREAMING --transport error / idle timeout-----> ERRORED
//! ```
//!
//! Both end states are terminal and ignore any further input. The assistant
//! turn is committed at most once, on whichever transition happens first:
//! - sentinel: commit the accumulated reply, even if empty
//! - upstream closed without a sentinel: commit if anything was accumulated
//! - transport error: commit if anything was accumulated
//!
//! Every stream that started ends with exactly one terminal frame, either
//! [`RelayFrame::Done`] or [`RelayFrame::Error`].

use async_stream::stream;
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::{ChatRelay, RelayError};
use crate::models::StreamChunk;
use crate::session::{SessionStore, Turn};
use crate::upstream::sse::data_payload;
use crate::upstream::types::CompletionChunk;
use crate::upstream::{LineStream, UpstreamError, UpstreamRequest};

/// Payload the provider sends to mark the end of its reply
pub const UPSTREAM_DONE: &str = "[DONE]";

/// Client-facing frames, in the order they must be sent
pub type FrameStream = Pin<Box<dyn Stream<Item = RelayFrame> + Send>>;

/// One unit of output for the client
#[derive(Debug)]
pub enum RelayFrame {
    /// A content fragment, forwarded as soon as it arrives
    Content(StreamChunk),
    /// The reply is complete
    Done,
    /// The upstream transport failed after the stream started
    Error(RelayError),
}

/// Lifecycle of one streamed reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Streaming,
    Done,
    Errored,
}

/// What a single upstream line amounted to
#[derive(Debug, PartialEq, Eq)]
pub enum LineOutcome {
    /// Nothing to forward
    Ignored,
    /// A content fragment to forward
    Fragment(String),
    /// The completion sentinel, seen for the first time
    Completed,
}

/// Per-stream state: the history being extended and the reply so far
#[derive(Debug)]
pub struct StreamSession {
    session_id: String,
    history: Vec<Turn>,
    accumulated: String,
    state: StreamState,
    committed: bool,
}

impl StreamSession {
    /// Start a stream for `session_id` whose history already ends with the user turn
    pub fn new(session_id: impl Into<String>, history: Vec<Turn>) -> Self {
        Self {
            session_id: session_id.into(),
            history,
            accumulated: String::new(),
            state: StreamState::Streaming,
            committed: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Reply text accumulated so far, fragments concatenated in arrival order
    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// Feed one complete upstream line
    ///
    /// Malformed payloads are logged and skipped so one bad record does not
    /// cost the rest of the reply.
    pub fn accept_line(&mut self, line: &str) -> LineOutcome {
        if self.state != StreamState::Streaming {
            return LineOutcome::Ignored;
        }
        if line.trim().is_empty() {
            return LineOutcome::Ignored;
        }

        let Some(payload) = data_payload(line) else {
            debug!(session_id = %self.session_id, line, "Skipping non-data line");
            return LineOutcome::Ignored;
        };

        if payload == UPSTREAM_DONE {
            self.state = StreamState::Done;
            return LineOutcome::Completed;
        }
        if payload.is_empty() {
            return LineOutcome::Ignored;
        }

        match serde_json::from_str::<CompletionChunk>(payload) {
            Ok(chunk) => match chunk.fragment() {
                Some(fragment) => {
                    self.accumulated.push_str(&fragment);
                    LineOutcome::Fragment(fragment)
                }
                None => LineOutcome::Ignored,
            },
            Err(e) => {
                let err = UpstreamError::Protocol(format!("{}: '{}'", e, payload));
                warn!(session_id = %self.session_id, error = %err, "Skipping malformed stream payload");
                LineOutcome::Ignored
            }
        }
    }

    /// Upstream closed without sending the sentinel
    pub fn close(&mut self) {
        if self.state == StreamState::Streaming {
            self.state = StreamState::Done;
        }
    }

    /// Upstream transport failed
    pub fn fail(&mut self) {
        if self.state == StreamState::Streaming {
            self.state = StreamState::Errored;
        }
    }

    /// History to write back, handed out at most once per stream
    ///
    /// With `allow_empty` false nothing is committed unless at least one
    /// fragment arrived.
    pub fn take_commit(&mut self, allow_empty: bool) -> Option<Vec<Turn>> {
        if self.committed || (!allow_empty && self.accumulated.is_empty()) {
            return None;
        }
        self.committed = true;

        let mut history = std::mem::take(&mut self.history);
        history.push(Turn::assistant(self.accumulated.clone()));
        Some(history)
    }
}

impl ChatRelay {
    /// Relay one message and return the reply as client frames
    ///
    /// An error returned here means the upstream call never started and the
    /// session is untouched. Once frames are returned, the stream always ends
    /// with `Done` or `Error`. Dropping the frame stream drops the upstream
    /// connection, and nothing is committed afterwards.
    pub async fn stream(&self, message: &str, session_id: &str) -> Result<FrameStream, RelayError> {
        let mut history = self.store.history(session_id).await;
        history.push(Turn::user(message));

        let request = UpstreamRequest::streamed(self.app_code.clone(), history.clone());
        let lines = self.provider.send_streamed(request).await?;

        Ok(relay_frames(
            lines,
            StreamSession::new(session_id, history),
            self.store.clone(),
            self.idle_timeout,
        ))
    }
}

/// Wait for the next upstream line, turning a stall into a stream error
async fn next_line(
    lines: &mut LineStream,
    idle_timeout: Option<Duration>,
) -> Option<Result<String, UpstreamError>> {
    match idle_timeout {
        Some(limit) => match tokio::time::timeout(limit, lines.next()).await {
            Ok(next) => next,
            Err(_) => Some(Err(UpstreamError::Stream(format!(
                "no data from upstream for {:?}",
                limit
            )))),
        },
        None => lines.next().await,
    }
}

async fn commit(store: &Arc<dyn SessionStore>, session: &mut StreamSession, allow_empty: bool) {
    if let Some(history) = session.take_commit(allow_empty) {
        let turns = history.len();
        store.append_and_save(session.session_id(), history).await;
        info!(session_id = %session.session_id(), turns, "Committed streamed reply");
    }
}

/// Drive the upstream lines through a [`StreamSession`] and emit client frames
pub fn relay_frames(
    mut lines: LineStream,
    mut session: StreamSession,
    store: Arc<dyn SessionStore>,
    idle_timeout: Option<Duration>,
) -> FrameStream {
    Box::pin(stream! {
        loop {
            match next_line(&mut lines, idle_timeout).await {
                Some(Ok(line)) => match session.accept_line(&line) {
                    LineOutcome::Fragment(content) => {
                        yield RelayFrame::Content(StreamChunk {
                            content,
                            session_id: session.session_id().to_string(),
                        });
                    }
                    LineOutcome::Completed => {
                        commit(&store, &mut session, true).await;
                        debug!(session_id = %session.session_id(), "Upstream sent completion sentinel");
                        yield RelayFrame::Done;
                        return;
                    }
                    LineOutcome::Ignored => {}
                },
                Some(Err(e)) => {
                    error!(session_id = %session.session_id(), error = %e, "Stream error from upstream");
                    session.fail();
                    commit(&store, &mut session, false).await;
                    yield RelayFrame::Error(RelayError::from(e));
                    return;
                }
                None => {
                    warn!(session_id = %session.session_id(), "Upstream closed without completion sentinel");
                    session.close();
                    commit(&store, &mut session, false).await;
                    yield RelayFrame::Done;
                    return;
                }
            }
        }
    })
}
