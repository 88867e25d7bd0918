// Handlers module

pub mod chat;
pub mod chat_stream;
pub mod rejection;

pub use chat::chat_handler;
pub use chat_stream::chat_stream_handler;
pub use rejection::handle_rejection;

use crate::models::ErrorResponse;
use warp::http::StatusCode;
use warp::Reply;

/// Buffered JSON error response
pub(crate) fn error_reply(status: StatusCode, message: &str) -> warp::reply::Response {
    warp::reply::with_status(warp::reply::json(&ErrorResponse::new(message)), status)
        .into_response()
}
