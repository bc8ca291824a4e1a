//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: set in the config builder
//! 2. **Config file**: TOML file specified by `CLAIMS_CONFIG` env var
//! 3. **Environment variables**: `CLAIMS__*` env vars override specific
//!    fields, with `__` as the nesting separator
//!    (e.g. `CLAIMS__SERVER__BIND_PORT=8080`)
//!
//! # Configuration Sections
//!
//! - [`ServerConfig`]: HTTP server settings (bind address, body limit)
//! - [`DatabaseConfig`]: `SQLite` URL and aggregate query timeout
//! - [`LeaderboardConfig`]: top-N capacity and freshness TTL
//! - [`RateLimitConfig`]: per-client budget for the read endpoint
//! - [`LoggingConfig`]: log level and format
//! - [`MetricsConfig`]: Prometheus endpoint toggle
//!
//! # Validation
//!
//! Configuration is validated at load time. Invalid configurations (zero
//! leaderboard capacity, empty database URL, zero-length rate-limit window)
//! return errors rather than failing silently at first use.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// HTTP server configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// IP address to bind the server to. Defaults to `127.0.0.1`.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port number to listen on. Defaults to `8000`.
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Maximum accepted request body, in bytes. Defaults to 1 MiB.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    8000
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Database connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL. Defaults to `sqlite://claims.db?mode=rwc`.
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Budget for the aggregate query, in seconds. The query is retried
    /// once before failing. Defaults to `5`.
    #[serde(default = "default_query_timeout_seconds")]
    pub query_timeout_seconds: u64,
}

fn default_database_url() -> String {
    "sqlite://claims.db?mode=rwc".to_string()
}

fn default_query_timeout_seconds() -> u64 {
    5
}

/// Leaderboard sizing and freshness settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    /// Number of providers the leaderboard holds. Defaults to `10`.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Seconds a repopulation stays authoritative before the next read goes
    /// back to the store. Defaults to `60`.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

fn default_capacity() -> usize {
    10
}

fn default_ttl_seconds() -> u64 {
    60
}

/// Per-client budget for the read endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per window per client. Defaults to `10`.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds. Defaults to `60`.
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
}

fn default_max_requests() -> u32 {
    10
}

fn default_window_seconds() -> u64 {
    60
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level when `RUST_LOG` is unset. Defaults to `info`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `pretty` or `json`. Defaults to `pretty`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Metrics endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether `/metrics` is served. Defaults to `true`.
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

fn default_metrics_enabled() -> bool {
    true
}

/// Root application configuration.
///
/// Loaded from TOML files and environment variables with the `CLAIMS__`
/// prefix using `__` as a separator for nested fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment (e.g. "development", "production").
    #[serde(default = "default_environment")]
    pub environment: String,

    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub leaderboard: LeaderboardConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

fn default_environment() -> String {
    "development".to_string()
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or
    /// deserialized, or if validation fails.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .set_default("environment", "development")?
            .set_default("server.bind_address", "127.0.0.1")?
            .set_default("server.bind_port", 8000)?
            .set_default("server.max_body_bytes", 1024 * 1024)?
            .set_default("database.url", "sqlite://claims.db?mode=rwc")?
            .set_default("database.query_timeout_seconds", 5)?
            .set_default("leaderboard.capacity", 10)?
            .set_default("leaderboard.ttl_seconds", 60)?
            .set_default("rate_limit.max_requests", 10)?
            .set_default("rate_limit.window_seconds", 60)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("metrics.enabled", true)?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("CLAIMS").separator("__"))
            .build()?;

        let config: Self = config_builder.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from `config/config.toml` with fallback to
    /// defaults. The path can be overridden with the `CLAIMS_CONFIG`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded,
    /// parsed, or validated.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CLAIMS_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());
        Self::from_file(&config_path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.leaderboard.capacity == 0 {
            return Err(ConfigError::Message(
                "leaderboard.capacity must be at least 1".to_string(),
            ));
        }
        if self.database.url.is_empty() {
            return Err(ConfigError::Message("database.url must not be empty".to_string()));
        }
        if self.rate_limit.window_seconds == 0 {
            return Err(ConfigError::Message(
                "rate_limit.window_seconds must be non-zero".to_string(),
            ));
        }
        if self.rate_limit.max_requests == 0 {
            return Err(ConfigError::Message(
                "rate_limit.max_requests must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the parsed socket address for the HTTP server.
    ///
    /// # Errors
    ///
    /// Returns an error string if `bind_address`/`bind_port` do not form a
    /// valid socket address.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, String> {
        format!("{}:{}", self.server.bind_address, self.server.bind_port).parse().map_err(|_| {
            format!(
                "Invalid socket address: {}:{}",
                self.server.bind_address, self.server.bind_port
            )
        })
    }

    /// Aggregate query budget as a [`Duration`].
    #[must_use]
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.database.query_timeout_seconds)
    }

    /// Leaderboard freshness TTL as a [`Duration`].
    #[must_use]
    pub fn leaderboard_ttl(&self) -> Duration {
        Duration::from_secs(self.leaderboard.ttl_seconds)
    }

    /// Rate-limit window as a [`Duration`].
    #[must_use]
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit.window_seconds)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::from_file("definitely/not/a/config.toml").unwrap();

        assert_eq!(config.environment, "development");
        assert_eq!(config.server.bind_port, 8000);
        assert_eq!(config.leaderboard.capacity, 10);
        assert_eq!(config.leaderboard.ttl_seconds, 60);
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.rate_limit.window_seconds, 60);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.metrics.enabled);
    }

    #[test]
    fn socket_addr_combines_address_and_port() {
        let config = AppConfig::from_file("definitely/not/a/config.toml").unwrap();
        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn duration_helpers_convert_seconds() {
        let config = AppConfig::from_file("definitely/not/a/config.toml").unwrap();
        assert_eq!(config.query_timeout(), Duration::from_secs(5));
        assert_eq!(config.leaderboard_ttl(), Duration::from_secs(60));
        assert_eq!(config.rate_limit_window(), Duration::from_secs(60));
    }

    #[test]
    fn zero_capacity_fails_validation() {
        let mut config = AppConfig::from_file("definitely/not/a/config.toml").unwrap();
        config.leaderboard.capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_window_fails_validation() {
        let mut config = AppConfig::from_file("definitely/not/a/config.toml").unwrap();
        config.rate_limit.window_seconds = 0;
        assert!(config.validate().is_err());
    }
}
