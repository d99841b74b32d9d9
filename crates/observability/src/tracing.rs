//! Tracing/logging initialization.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// How log lines are filtered and printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset (e.g. `info`,
    /// `facturier_invoicing=debug`).
    pub filter: String,
    /// JSON lines when `true`, human-readable output otherwise.
    pub json: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: true,
        }
    }
}

/// Initialize tracing/logging for the process with [`TracingConfig::default`].
pub fn init() {
    init_with(&TracingConfig::default());
}

/// Initialize tracing/logging for the process.
///
/// `RUST_LOG` wins over `config.filter`. Safe to call multiple times
/// (subsequent calls are no-ops).
pub fn init_with(config: &TracingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.pretty().try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_is_harmless() {
        init_with(&TracingConfig {
            filter: "debug".to_string(),
            json: false,
        });
        init();
        ::tracing::info!("still logging");
    }

    #[test]
    fn invalid_filter_falls_back() {
        init_with(&TracingConfig {
            filter: "[[not a filter".to_string(),
            json: true,
        });
    }
}
