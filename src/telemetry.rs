//! Logging setup

use std::sync::OnceLock;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: OnceLock<()> = OnceLock::new();

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_level`. Calling this more than
/// once, or after another subscriber was installed, is a no-op.
pub fn init(default_level: &str) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        // Err only if a subscriber is already set, which is fine.
        let _ = fmt().with_env_filter(filter).with_target(false).try_init();
    });
}

/// Whether [`init`] has run.
#[must_use]
pub fn is_initialised() -> bool {
    INIT.get().is_some()
}
