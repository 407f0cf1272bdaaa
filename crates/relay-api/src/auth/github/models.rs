use axum::http::StatusCode;
use oauth2::AccessToken;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Provider name used in the messages exchanged with the admin panel.
pub const PROVIDER: &str = "github";

/// Query string the provider appends when redirecting back to the relay.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// JSON body posted to the token endpoint.
#[derive(Serialize)]
pub struct ExchangeRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub code: &'a str,
}

/// Token endpoint reply. GitHub answers `200` for both outcomes, so success
/// is decided by the presence of `access_token` alone.
#[derive(Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl TokenExchangeResponse {
    pub fn into_access_token(self, status: StatusCode) -> Result<AccessToken, ApiError> {
        match self.access_token {
            Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
            _ => Err(ApiError::Exchange(match (self.error, self.error_description) {
                (Some(error), Some(description)) => {
                    format!("provider returned {error}: {description}")
                }
                (Some(error), None) => format!("provider returned {error}"),
                _ => format!("no access token in provider response (status {status})"),
            })),
        }
    }
}
