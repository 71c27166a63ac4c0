use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use pollbus::config::load_config;
use pollbus::session::Server;
use pollbus::transport::websocket::start_websocket_server;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config().expect("failed to load configuration");
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let poll_timeout = Duration::from_secs(config.session.poll_timeout_secs);

    let server = Arc::new(Server::new());
    start_websocket_server(&addr, server, poll_timeout).await;
}
