use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use oauth2::AuthorizationCode;

use super::models::{CallbackQuery, PROVIDER};
use crate::{
    ApiState, auth::delivery::DeliveryPage, error::ApiError, metrics, middleware::rate_limit,
};

pub fn routes() -> Router<ApiState> {
    use crate::make_rate_limit_layer;

    Router::new()
        .route("/auth", get(authorize))
        .route("/callback", get(callback))
        .route("/api/callback", get(callback))
        .layer(make_rate_limit_layer!(
            rate_limit::AUTH_RATE_PER_SECOND,
            rate_limit::AUTH_BURST_SIZE
        ))
}

/// Send the browser to the provider's consent screen.
async fn authorize(State(state): State<ApiState>) -> Response {
    let url = state.github.authorize_url();

    tracing::info!(provider = PROVIDER, "Redirecting to provider authorization endpoint");
    metrics::record_auth_event("authorize", PROVIDER, true);

    // 302 rather than axum's 303 `Redirect::to`
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, url.to_string()),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
    )
        .into_response()
}

/// Exchange the provider's code for a token and render the delivery page.
async fn callback(
    State(state): State<ApiState>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
) -> Result<DeliveryPage, ApiError> {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Malformed callback query");
            metrics::record_auth_event("exchange", PROVIDER, false);
            return Err(ApiError::MissingCode);
        }
    };

    let code = match query {
        CallbackQuery {
            code: Some(code), ..
        } if !code.is_empty() => AuthorizationCode::new(code),
        CallbackQuery {
            error: Some(error),
            error_description,
            ..
        } => {
            metrics::record_auth_event("exchange", PROVIDER, false);
            return Err(ApiError::AccessDenied {
                error,
                description: error_description,
            });
        }
        _ => {
            metrics::record_auth_event("exchange", PROVIDER, false);
            return Err(ApiError::MissingCode);
        }
    };

    let token = match state.github.exchange_code(&code).await {
        Ok(token) => token,
        Err(e) => {
            metrics::record_auth_event("exchange", PROVIDER, false);
            return Err(e);
        }
    };

    tracing::info!(provider = PROVIDER, "Access token obtained, rendering delivery page");
    metrics::record_auth_event("exchange", PROVIDER, true);

    Ok(DeliveryPage::render(&token, &state.allowed_origins))
}
