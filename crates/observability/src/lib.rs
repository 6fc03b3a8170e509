//! Tracing/logging setup shared by every binary in the workspace.

use tracing_subscriber::EnvFilter;

/// Initialize process-wide tracing.
///
/// Filtering comes from `RUST_LOG` (default `info`). Output is JSON unless
/// `LOG_FORMAT=pretty`, which is friendlier during local development.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let pretty = std::env::var("LOG_FORMAT").is_ok_and(|v| v == "pretty");
    if pretty {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .with_target(false)
            .try_init();
    }
}
