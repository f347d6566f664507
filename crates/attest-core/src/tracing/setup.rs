//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the attest tracing/logging system.
///
/// Reads the `ATTEST_LOG` environment variable for per-subsystem levels,
/// e.g. `ATTEST_LOG=attest_engine::verify=debug,attest=info`.
/// Falls back to `attest=info` if unset or invalid.
///
/// Idempotent: calling it multiple times is safe.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("ATTEST_LOG")
            .unwrap_or_else(|_| EnvFilter::new("attest=info"));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
