//! Environment-based configuration.

use std::path::PathBuf;

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres URL. Absent means in-memory stores (dev/test mode).
    pub database_url: Option<String>,
    pub bind_addr: String,
    /// Directory holding the frontend bundle.
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        if database_url.is_none() {
            tracing::warn!("DATABASE_URL not set; using in-memory stores (data is not durable)");
        }

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| {
            let default = "0.0.0.0:8080".to_string();
            tracing::warn!("BIND_ADDR not set; defaulting to {default}");
            default
        });

        let static_dir = std::env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("static"));

        Self {
            database_url,
            bind_addr,
            static_dir,
        }
    }
}
