//! Service Configuration Module
//!
//! Configuration is loaded from environment variables with sensible
//! defaults for development. Three groups: the HTTP bind surface, the
//! content store, and the upstream project source. Database settings
//! live in `depot_storage::DbConfig`.

use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host for the HTTP listener.
    pub bind_host: String,

    /// Bind port for the HTTP listener.
    pub bind_port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            bind_port: 8005,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `DEPOT_BIND`: bind host (default: 0.0.0.0)
    /// - `PORT` / `DEPOT_PORT`: bind port (default: 8005)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_host: std::env::var("DEPOT_BIND").unwrap_or(defaults.bind_host),
            bind_port: std::env::var("PORT")
                .ok()
                .or_else(|| std::env::var("DEPOT_PORT").ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.bind_port),
        }
    }
}

// ============================================================================
// CONTENT STORE CONFIGURATION
// ============================================================================

/// Content store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base directory for archives, working trees, and bundles.
    pub data_dir: PathBuf,

    /// Maximum accepted archive size in bytes.
    pub max_archive_bytes: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./depot-data"),
            // 5 GiB, matching the largest project archives seen upstream
            max_archive_bytes: 5 * 1024 * 1024 * 1024,
        }
    }
}

impl StoreConfig {
    /// Create StoreConfig from environment variables.
    ///
    /// Environment variables:
    /// - `DEPOT_DATA_DIR`: base directory (default: ./depot-data)
    /// - `DEPOT_MAX_ARCHIVE_BYTES`: archive size cap (default: 5 GiB)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: std::env::var("DEPOT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            max_archive_bytes: std::env::var("DEPOT_MAX_ARCHIVE_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_archive_bytes),
        }
    }
}

// ============================================================================
// UPSTREAM CONFIGURATION
// ============================================================================

/// Upstream project source configuration.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the repository-metadata service, without trailing slash.
    pub base_url: String,

    /// TCP connect timeout.
    pub connect_timeout: Duration,

    /// Whole-request timeout for the metadata call. Archive downloads
    /// are not subject to this timeout; they stream until done.
    pub request_timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8004".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl UpstreamConfig {
    /// Create UpstreamConfig from environment variables.
    ///
    /// Environment variables:
    /// - `DEPOT_UPSTREAM_URL`: base URL (default: http://localhost:8004)
    /// - `DEPOT_UPSTREAM_CONNECT_TIMEOUT_SECS`: connect timeout (default: 10)
    /// - `DEPOT_UPSTREAM_TIMEOUT_SECS`: metadata request timeout (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("DEPOT_UPSTREAM_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            connect_timeout: Duration::from_secs(
                std::env::var("DEPOT_UPSTREAM_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            request_timeout: Duration::from_secs(
                std::env::var("DEPOT_UPSTREAM_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

// ============================================================================
// INDEX BACKEND SELECTION
// ============================================================================

/// Which artifact index adapter to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexBackend {
    /// In-process map, lost on restart. Development and tests.
    Memory,
    /// PostgreSQL table, the production default.
    Postgres,
}

impl IndexBackend {
    /// Read `DEPOT_INDEX` (`memory` or `postgres`, default `postgres`).
    pub fn from_env() -> Self {
        match std::env::var("DEPOT_INDEX").as_deref() {
            Ok("memory") => IndexBackend::Memory,
            _ => IndexBackend::Postgres,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_api_config() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_host, "0.0.0.0");
        assert_eq!(config.bind_port, 8005);
    }

    #[test]
    fn test_default_store_config() {
        let config = StoreConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./depot-data"));
        assert_eq!(config.max_archive_bytes, 5 * 1024 * 1024 * 1024);
    }

    #[test]
    fn test_default_upstream_config() {
        let config = UpstreamConfig::default();
        assert_eq!(config.base_url, "http://localhost:8004");
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
