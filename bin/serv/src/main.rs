use std::net::SocketAddr;

use relay_api::{config::ApiConfig, state::ApiState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from .env and environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    relay_api::tracing::init_tracing(&config.env)?;
    tracing::info!(?config, "Configuration loaded");

    let metrics_handle = relay_api::metrics::init_metrics()?;
    let state = ApiState::new(&config)?;

    let app = relay_api::router::app(&config, state, metrics_handle);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Relay listening on http://{}", listener.local_addr()?);

    // Connect info is needed by the rate limiter when no proxy headers are present
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
