//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber for the binary
//! - Honour `RUST_LOG`, falling back to the configured level
//! - Choose JSON or human-readable output

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::ObservabilityConfig;

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "route_engine=info";

fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config.log_level.is_empty() {
            DEFAULT_FILTER.into()
        } else {
            format!("route_engine={}", config.log_level).into()
        }
    })
}

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init(config: &ObservabilityConfig) {
    let registry = tracing_subscriber::registry().with(env_filter(config));
    let result = if config.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
