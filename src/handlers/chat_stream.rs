// POST /api/chat/stream handler

use crate::handlers::error_reply;
use crate::models::ChatRequest;
use crate::relay::{ChatRelay, FrameStream, RelayFrame};
use crate::sse::{create_content_event, create_done_event, create_error_event};
use futures_util::StreamExt;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info};
use warp::http::StatusCode;
use warp::sse::Event;
use warp::Reply;

/// Message of the in-band error event
const STREAM_ERROR_MESSAGE: &str = "Upstream API stream error";

/// Events buffered between the relay task and the response body
const EVENT_BUFFER: usize = 16;

pub async fn chat_stream_handler(
    request: ChatRequest,
    relay: ChatRelay,
) -> Result<warp::reply::Response, Infallible> {
    info!(session_id = %request.session_id, "POST /api/chat/stream");

    let mut frames = match relay.stream(&request.message, &request.session_id).await {
        Ok(frames) => frames,
        Err(e) => {
            error!(session_id = %request.session_id, error = %e, "Error setting up upstream stream");
            return Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to setup stream with AI",
            ));
        }
    };

    // The response head is only sent with the first frame, so a failure
    // before then can still be answered with a plain error status.
    let first = frames.next().await;
    if let Some(RelayFrame::Error(e)) = &first {
        error!(session_id = %request.session_id, error = %e, "Stream failed before first event");
        return Ok(error_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Stream error from AI provider",
        ));
    }

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    tokio::spawn(forward_frames(first, frames, tx, request.session_id));

    let events = warp::sse::keep_alive().stream(ReceiverStream::new(rx));
    Ok(warp::sse::reply(events).into_response())
}

/// Pumps relay frames into the response channel.
///
/// Returns as soon as the client side of the channel goes away; dropping
/// `frames` at that point releases the upstream stream without committing.
async fn forward_frames(
    first: Option<RelayFrame>,
    mut frames: FrameStream,
    tx: mpsc::Sender<Result<Event, Infallible>>,
    session_id: String,
) {
    if let Some(frame) = first {
        if tx.send(frame_to_event(frame)).await.is_err() {
            debug!(session_id = %session_id, "Client disconnected");
            return;
        }
    }

    loop {
        tokio::select! {
            _ = tx.closed() => {
                debug!(session_id = %session_id, "Client disconnected");
                break;
            }
            next = frames.next() => match next {
                Some(frame) => {
                    if tx.send(frame_to_event(frame)).await.is_err() {
                        debug!(session_id = %session_id, "Client disconnected");
                        break;
                    }
                }
                None => break,
            },
        }
    }
}

fn frame_to_event(frame: RelayFrame) -> Result<Event, Infallible> {
    match frame {
        RelayFrame::Content(chunk) => create_content_event(&chunk),
        RelayFrame::Done => create_done_event(),
        RelayFrame::Error(_) => create_error_event(STREAM_ERROR_MESSAGE),
    }
}
