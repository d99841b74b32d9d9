//! Tracing/logging setup shared by binaries and integration tests.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::TracingConfig;

/// Initialize process-wide logging with defaults (`RUST_LOG` or `info`, JSON).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize process-wide logging from an explicit configuration.
pub fn init_with(config: &TracingConfig) {
    tracing::init_with(config);
}
