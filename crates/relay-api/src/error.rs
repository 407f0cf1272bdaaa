use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The provider did not hand out a usable access token.
    #[error("Exchange Error: {0}")]
    Exchange(String),
    #[error("Missing authorization code")]
    MissingCode,
    #[error("Authorization denied by provider: {error}{}", parenthesized(.description))]
    AccessDenied {
        error: String,
        description: Option<String>,
    },
}

fn parenthesized(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Exchange(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingCode | Self::AccessDenied { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "OAuth relay request failed");
        } else {
            tracing::warn!(error = %self, "OAuth relay request rejected");
        }

        (
            status,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            self.to_string(),
        )
            .into_response()
    }
}
