use crate::{
    ApiConfig,
    auth::github::{GithubClient, create_github_client},
    config::Environment,
};

/// Shared, read-only handler state. Nothing here changes between requests.
#[derive(Clone, Debug)]
pub struct ApiState {
    pub github: GithubClient,
    /// Admin panel origins the delivery page may post the token to.
    pub allowed_origins: Vec<String>,
    pub environment: Environment,
}

impl ApiState {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let github = create_github_client(config)?;

        let allowed_origins = config.parsed_allowed_origins();
        if allowed_origins.is_empty() {
            tracing::warn!(
                "ALLOWED_ORIGINS not set, tokens will be delivered to whichever origin answers the handshake"
            );
        }

        Ok(Self {
            github,
            allowed_origins,
            environment: config.env.clone(),
        })
    }
}
