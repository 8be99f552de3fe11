//! Tracing subscriber setup

use crate::config::LogConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub fn default_directive(config: &LogConfig) -> String {
    let level = config.level.to_ascii_lowercase();
    format!("fairdice={level},tower_http={level}")
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `log.level`.
///
/// Calling this more than once is harmless; later calls keep the first subscriber.
pub fn init_tracing(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
}
