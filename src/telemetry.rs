// src/telemetry.rs

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber used by the binaries. `RUST_LOG` wins over
/// `default_level`. Calling it twice is harmless.
pub fn init_tracing(default_level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string().to_lowercase()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
