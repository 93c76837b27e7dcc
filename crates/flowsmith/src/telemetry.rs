//! Tracing setup for binaries and tests that embed flowsmith.

use tracing_subscriber::EnvFilter;

/// Install a compact `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_level`.  Calling this more
/// than once is harmless; only the first subscriber is installed.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
