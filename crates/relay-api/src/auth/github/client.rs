use std::time::Duration;

use anyhow::Context;
use oauth2::{
    AccessToken, AuthUrl, AuthorizationCode, ClientId, ClientSecret, RedirectUrl, Scope, TokenUrl,
    url::Url,
};
use reqwest::header::ACCEPT;

use super::models::{ExchangeRequest, TokenExchangeResponse};
use crate::{ApiConfig, error::ApiError};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Confidential GitHub OAuth client used by the relay.
#[derive(Clone, Debug)]
pub struct GithubClient {
    http: reqwest::Client,
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    scope: Scope,
    redirect_url: Option<RedirectUrl>,
}

/// Create the GitHub client from the relay configuration
pub fn create_github_client(config: &ApiConfig) -> anyhow::Result<GithubClient> {
    let auth_url = AuthUrl::new(config.github_authorize_url.clone())
        .context("GITHUB_AUTHORIZE_URL is not a valid URL")?;
    let token_url = TokenUrl::new(config.github_token_url.clone())
        .context("GITHUB_TOKEN_URL is not a valid URL")?;
    let redirect_url = config
        .oauth_redirect_url
        .clone()
        .map(RedirectUrl::new)
        .transpose()
        .context("OAUTH_REDIRECT_URL is not a valid URL")?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.provider_timeout_secs))
        .user_agent(USER_AGENT)
        .build()?;

    Ok(GithubClient {
        http,
        client_id: ClientId::new(config.github_client_id.clone()),
        client_secret: ClientSecret::new(config.github_client_secret.clone()),
        auth_url,
        token_url,
        scope: Scope::new(config.oauth_scope.clone()),
        redirect_url,
    })
}

impl GithubClient {
    /// Authorization endpoint URL carrying `client_id`, `scope` and the
    /// optional `redirect_uri`.
    pub fn authorize_url(&self) -> Url {
        let mut url = self.auth_url.url().clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", self.client_id.as_str())
                .append_pair("scope", self.scope.as_str());
            if let Some(redirect_url) = &self.redirect_url {
                query.append_pair("redirect_uri", redirect_url.as_str());
            }
        }
        url
    }

    /// Trade a one-time authorization code for an access token.
    ///
    /// Exactly one request is made; failures are never retried since the
    /// provider invalidates the code on first use.
    pub async fn exchange_code(&self, code: &AuthorizationCode) -> Result<AccessToken, ApiError> {
        let response = self
            .http
            .post(self.token_url.url().clone())
            .header(ACCEPT, "application/json")
            .json(&ExchangeRequest {
                client_id: self.client_id.as_str(),
                client_secret: self.client_secret.secret(),
                code: code.secret(),
            })
            .send()
            .await
            .map_err(|e| ApiError::Exchange(format!("token endpoint request failed: {e}")))?;

        let status = response.status();
        tracing::debug!(%status, "Token endpoint responded");

        let body: TokenExchangeResponse = response.json().await.map_err(|e| {
            ApiError::Exchange(format!("unreadable token response (status {status}): {e}"))
        })?;

        body.into_access_token(status)
    }
}
