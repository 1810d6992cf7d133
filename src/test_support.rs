//! Shared helpers for unit tests.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness.
///
/// Defaults to `DEBUG`; `RUST_LOG` overrides it. Safe to call from every
/// test, only the first call installs the subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::DEBUG.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_test_writer()
        .try_init();
}
