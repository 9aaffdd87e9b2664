use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use knoverse_backend::core::config::{AppPaths, ConfigService};
use knoverse_backend::core::logging;
use knoverse_backend::server;
use knoverse_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    let config = ConfigService::new(paths.clone());
    let settings = AppState::load_settings(&config)?;
    logging::init(&paths, &settings.logging.level);

    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);
    let state = AppState::initialize(config, settings).await?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    println!("KNOVERSE_PORT={}", addr.port());
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, server::router(state))
        .await
        .context("Server error")?;

    Ok(())
}
