// POST /api/chat handler

use crate::handlers::error_reply;
use crate::models::ChatRequest;
use crate::relay::ChatRelay;
use std::convert::Infallible;
use tracing::{error, info};
use warp::http::StatusCode;
use warp::Reply;

pub async fn chat_handler(
    request: ChatRequest,
    relay: ChatRelay,
) -> Result<warp::reply::Response, Infallible> {
    info!(session_id = %request.session_id, "POST /api/chat");

    match relay.send(&request.message, &request.session_id).await {
        Ok(reply) => Ok(warp::reply::json(&reply).into_response()),
        Err(e) => {
            error!(session_id = %request.session_id, error = %e, "Error calling upstream (non-stream)");
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to get response from AI",
            ))
        }
    }
}
