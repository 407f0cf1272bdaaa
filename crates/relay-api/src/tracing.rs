//! Logging setup for the relay.
//!
//! Development gets pretty, colored output with file and line numbers at
//! DEBUG. Production gets flattened JSON events at INFO, carrying the
//! `request_id` span field set by the request ID middleware.
//!
//! `RUST_LOG` overrides the default filter (e.g. `RUST_LOG=relay_api=trace`).
//! Tokens, client secrets and authorization codes are never logged.

use tracing_subscriber::{
    EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
};

use crate::config::Environment;

const DEVELOPMENT_FILTER: &str = "debug,tower_http=debug,hyper_util=info,reqwest=info";
const PRODUCTION_FILTER: &str = "info,tower_http=info,hyper_util=warn,reqwest=warn";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber for `env`.
///
/// Fails if a subscriber is already installed, which is the case on
/// platforms that set up tracing themselves.
pub fn init_tracing(env: &Environment) -> Result<(), TryInitError> {
    if env.is_development() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .pretty()
                    .with_filter(env_filter(DEVELOPMENT_FILTER)),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .flatten_event(true)
                    .with_target(true)
                    .with_filter(env_filter(PRODUCTION_FILTER)),
            )
            .try_init()?;
    }

    tracing::info!(environment = ?env, "Tracing initialized");
    Ok(())
}
