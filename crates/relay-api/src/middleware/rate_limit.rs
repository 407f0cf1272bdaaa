//! Per-client rate limits for the login endpoints.
//!
//! Keys are extracted with `SmartIpKeyExtractor`, which looks at
//! `X-Forwarded-For`, `X-Real-IP` and `Forwarded` before falling back to the
//! peer address, so the server must be run with connect info.

/// Login popups hit `/auth` and `/callback` once each per sign-in.
pub const AUTH_RATE_PER_SECOND: u64 = 2;
pub const AUTH_BURST_SIZE: u32 = 10;

/// Build a `GovernorLayer` keyed on the client IP.
#[macro_export]
macro_rules! make_rate_limit_layer {
    ($per_second:expr, $burst_size:expr) => {{
        let config = ::tower_governor::governor::GovernorConfigBuilder::default()
            .per_second($per_second)
            .burst_size($burst_size)
            .key_extractor(::tower_governor::key_extractor::SmartIpKeyExtractor)
            .use_headers()
            .finish()
            .expect("rate limit period and burst size must be non-zero");

        ::tower_governor::GovernorLayer::new(config)
    }};
}
