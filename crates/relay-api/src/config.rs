use std::fmt;

use serde::Deserialize;

pub const DEFAULT_SCOPE: &str = "repo,user";
pub const DEFAULT_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),
    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Relay configuration, read once at startup.
///
/// Keys map to upper-case environment variables (`github_client_id` is read
/// from `GITHUB_CLIENT_ID`).
#[derive(Clone, Deserialize)]
pub struct ApiConfig {
    pub github_client_id: String,
    pub github_client_secret: String,
    #[serde(default = "default_scope")]
    pub oauth_scope: String,
    #[serde(default)]
    pub oauth_redirect_url: Option<String>,
    #[serde(default = "default_authorize_url")]
    pub github_authorize_url: String,
    #[serde(default = "default_token_url")]
    pub github_token_url: String,
    /// Comma separated list of admin panel origins.
    #[serde(default)]
    pub allowed_origins: Option<String>,
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,
    #[serde(default)]
    pub site_dir: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default, rename = "app_env")]
    pub env: Environment,
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

fn default_authorize_url() -> String {
    DEFAULT_AUTHORIZE_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

const fn default_provider_timeout_secs() -> u64 {
    10
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

impl ApiConfig {
    /// Build a config with only the credentials set and everything else defaulted.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            github_client_id: client_id.into(),
            github_client_secret: client_secret.into(),
            oauth_scope: default_scope(),
            oauth_redirect_url: None,
            github_authorize_url: default_authorize_url(),
            github_token_url: default_token_url(),
            allowed_origins: None,
            provider_timeout_secs: default_provider_timeout_secs(),
            site_dir: None,
            host: default_host(),
            port: default_port(),
            env: Environment::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Deserialize from any key/value source, e.g. a captured environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "shuttle")]
    pub fn from_shuttle_secrets(
        secrets: &shuttle_runtime::SecretStore,
    ) -> Result<Self, ConfigError> {
        const KEYS: [&str; 11] = [
            "GITHUB_CLIENT_ID",
            "GITHUB_CLIENT_SECRET",
            "OAUTH_SCOPE",
            "OAUTH_REDIRECT_URL",
            "GITHUB_AUTHORIZE_URL",
            "GITHUB_TOKEN_URL",
            "ALLOWED_ORIGINS",
            "PROVIDER_TIMEOUT_SECS",
            "SITE_DIR",
            "PORT",
            "APP_ENV",
        ];

        let vars = KEYS
            .iter()
            .filter_map(|key| secrets.get(key).map(|value| (key.to_string(), value)));
        Self::from_vars(vars)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.github_client_id.trim().is_empty() {
            return Err(ConfigError::Missing("GITHUB_CLIENT_ID"));
        }
        if self.github_client_secret.trim().is_empty() {
            return Err(ConfigError::Missing("GITHUB_CLIENT_SECRET"));
        }
        if self.provider_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "PROVIDER_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Allowed admin panel origins, trimmed and without trailing slashes.
    pub fn parsed_allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/'))
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// The client secret must never end up in logs.
impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("github_client_id", &self.github_client_id)
            .field("github_client_secret", &"[redacted]")
            .field("oauth_scope", &self.oauth_scope)
            .field("oauth_redirect_url", &self.oauth_redirect_url)
            .field("github_authorize_url", &self.github_authorize_url)
            .field("github_token_url", &self.github_token_url)
            .field("allowed_origins", &self.allowed_origins)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("site_dir", &self.site_dir)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("env", &self.env)
            .finish()
    }
}
