use relay_api::{config::ApiConfig, state::ApiState};

#[shuttle_runtime::main]
async fn main(
    #[shuttle_runtime::Secrets] secrets: shuttle_runtime::SecretStore,
) -> shuttle_axum::ShuttleAxum {
    // Load configuration from Shuttle secrets
    let config = ApiConfig::from_shuttle_secrets(&secrets)
        .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    // Note: Shuttle already initializes tracing, so we skip our custom init

    let metrics_handle = relay_api::metrics::init_metrics()?;
    tracing::info!("Prometheus metrics exporter initialized");

    let state = ApiState::new(&config)?;
    let app = relay_api::router::app(&config, state, metrics_handle);

    tracing::info!("Environment: {:?}", config.env);
    tracing::info!("  - GET /auth redirects to the GitHub authorization endpoint");
    tracing::info!("  - GET /callback and /api/callback exchange the code and deliver the token");
    tracing::info!("  - Prometheus metrics at /metrics, health check at /health");

    // Shuttle serves the router with its own listener
    Ok(app.into())
}
