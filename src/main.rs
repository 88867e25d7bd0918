use std::sync::Arc;

use chat_gateway::config::GatewayConfig;
use chat_gateway::relay::ChatRelay;
use chat_gateway::routes::configure_routes;
use chat_gateway::session::InMemorySessionStore;
use chat_gateway::upstream::LinkAiClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = GatewayConfig::from_env()?;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let provider = LinkAiClient::new(
        config.api_url.clone(),
        config.api_key.clone(),
        config.connect_timeout,
    )?;
    let relay = ChatRelay::new(
        Arc::new(InMemorySessionStore::new()),
        Arc::new(provider),
        config.app_code.clone(),
    )
    .with_idle_timeout(config.stream_idle_timeout);

    let routes = configure_routes(relay);

    let addr = config.bind_address();
    info!(upstream = %config.api_url, "Starting server on http://{}", addr);
    warp::serve(routes).run(addr).await;

    Ok(())
}
