//! Initialization of the global `tracing` subscriber.

use std::sync::Once;

use thiserror::Error;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable enabling log output in tests.
const ENABLE_TRACING_ENV_NAME: &str = "ENABLE_TRACING";

/// Filter directive used when `RUST_LOG` is not set.
const DEFAULT_DIRECTIVE: &str = "info";

static TEST_TRACING: Once = Once::new();

/// Errors that can occur while installing the subscriber.
#[derive(Debug, Error)]
pub enum TracingError {
    /// A global subscriber was already installed.
    #[error("failed to install the tracing subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Installs the global subscriber of a binary.
///
/// Logs go to stderr so that standard output stays free for program output. The filter is read
/// from `RUST_LOG`, defaulting to `info` for everything.
pub fn init_tracing(app_name: &str) -> Result<(), TracingError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init()?;

    ::tracing::debug!(app_name, "tracing initialized");

    Ok(())
}

/// Installs a subscriber for tests when `ENABLE_TRACING` is set.
///
/// Safe to call from every test, only the first call has an effect.
pub fn init_test_tracing() {
    TEST_TRACING.call_once(|| {
        if std::env::var(ENABLE_TRACING_ENV_NAME).is_err() {
            return;
        }

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        // Another test harness may already have installed a subscriber.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_test_writer())
            .try_init();
    });
}
