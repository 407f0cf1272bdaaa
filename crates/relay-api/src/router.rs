use std::path::Path;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    ApiConfig, auth,
    metrics::{metrics_handler, track_metrics},
    middleware::{
        cors::create_cors_layer, request_id::request_id_middleware,
        security_headers::apply_security_headers,
    },
    state::ApiState,
};

/// Relay routes. With `site_dir` set, unmatched requests are served from the
/// built site (marketing pages and the CMS admin bundle) instead of a 404.
pub fn router(site_dir: Option<&Path>) -> Router<ApiState> {
    let router = Router::new()
        .route("/health", get(health))
        .merge(auth::routes());

    match site_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(handler_404),
    }
}

/// The complete application: relay routes, `/metrics`, and the middleware stack.
pub fn app(config: &ApiConfig, state: ApiState, metrics_handle: PrometheusHandle) -> Router {
    let site_dir = config.site_dir.as_deref().map(Path::new);
    if let Some(dir) = site_dir {
        tracing::info!(dir = %dir.display(), "Serving static site");
    }

    let metrics_app = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    // Path only: the callback query string carries the authorization code
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!("http", method = %req.method(), path = %req.uri().path())
        })
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Wraps the fallback too, so site files and 404s are counted
    let app = router(site_dir)
        .layer(middleware::from_fn(track_metrics))
        .with_state(state)
        .merge(metrics_app)
        .layer(create_cors_layer(config.parsed_allowed_origins()))
        .layer(trace_layer)
        .layer(middleware::from_fn(request_id_middleware));

    apply_security_headers(app, config.env.clone())
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}
