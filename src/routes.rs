// Route definitions and handlers

use crate::handlers;
use crate::relay::ChatRelay;
use std::convert::Infallible;
use warp::Filter;

pub fn configure_routes(
    relay: ChatRelay,
) -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone {
    let api = warp::path("api").and(warp::path("chat"));

    // POST /api/chat
    let chat = api
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with_relay(relay.clone()))
        .and_then(handlers::chat_handler);

    // POST /api/chat/stream
    let chat_stream = api
        .and(warp::path("stream"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with_relay(relay))
        .and_then(handlers::chat_stream_handler);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["POST", "OPTIONS"])
        .allow_headers(vec!["content-type"]);

    // Combine routes; every request gets a tracing span
    chat.or(chat_stream)
        .with(cors)
        .recover(handlers::handle_rejection)
        .with(warp::trace::request())
}

fn with_relay(relay: ChatRelay) -> impl Filter<Extract = (ChatRelay,), Error = Infallible> + Clone {
    warp::any().map(move || relay.clone())
}
