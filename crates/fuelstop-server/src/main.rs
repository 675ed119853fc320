//! Fuel-stop server - REST backend for route fuel planning

use anyhow::Result;
use fuelstop_server::{api, config::Config, state::AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fuelstop_server=debug".parse()?),
        )
        .init();

    tracing::info!("Starting fuel-stop server...");

    let config = Config::from_env();
    if config.ors_api_key.is_empty() {
        tracing::warn!("ORS_API_KEY is not set; routing requests will be rejected upstream");
    }
    let port = config.server_port;
    let state = Arc::new(AppState::from_config(&config)?);

    let app = api::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
