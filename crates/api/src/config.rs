//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use chrono::TimeDelta;
use domain::{Catalog, CatalogError};
use projections::DEFAULT_REVERT_MS;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `CATALOG_PATH` — JSON catalog file (default: the built-in storefront)
/// - `FEEDBACK_REVERT_MS` — how long "Added!" stays on a button (default: `1500`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub catalog_path: Option<PathBuf>,
    pub feedback_revert_ms: i64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            catalog_path: std::env::var_os("CATALOG_PATH").map(PathBuf::from),
            feedback_revert_ms: std::env::var("FEEDBACK_REVERT_MS")
                .ok()
                .and_then(|ms| ms.parse().ok())
                .filter(|ms: &i64| *ms >= 0)
                .unwrap_or(DEFAULT_REVERT_MS),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn feedback_revert(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.feedback_revert_ms)
    }

    /// Loads the catalog from `catalog_path`, or the storefront defaults.
    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => Catalog::from_json_file(path),
            None => Ok(Catalog::storefront()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            catalog_path: None,
            feedback_revert_ms: DEFAULT_REVERT_MS,
        }
    }
}
