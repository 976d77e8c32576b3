#![forbid(unsafe_code)]

//! Test logging setup.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "rivulet_core=debug";

/// Install a `tracing` subscriber that writes through the test harness's
/// captured output.
///
/// Safe to call from every test: only the first call installs anything.
/// The filter comes from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
pub fn init_test_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_test_tracing();
        init_test_tracing();
        tracing::debug!(target: "rivulet_core", "logging ready");
    }
}
