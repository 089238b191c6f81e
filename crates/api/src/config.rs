//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `MINUTES_TO_PAYMENT_TIMEOUT`: payment window for new orders (default: `1`)
/// - `SCHEDULER_INTERVAL_MS`: period of the order-and-pay trigger (default: `5000`)
/// - `SCHEDULER_ENABLED`: whether the trigger runs at all (default: `true`)
/// - `DATABASE_URL`: PostgreSQL connection string; unset keeps events in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub minutes_to_payment_timeout: i64,
    pub scheduler_interval: Duration,
    pub scheduler_enabled: bool,
    pub database_url: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from any key lookup. Unparseable values fall
    /// back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            minutes_to_payment_timeout: lookup("MINUTES_TO_PAYMENT_TIMEOUT")
                .and_then(|m| m.parse().ok())
                .unwrap_or(defaults.minutes_to_payment_timeout),
            scheduler_interval: lookup("SCHEDULER_INTERVAL_MS")
                .and_then(|ms| ms.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.scheduler_interval),
            scheduler_enabled: lookup("SCHEDULER_ENABLED")
                .and_then(|flag| parse_flag(&flag))
                .unwrap_or(defaults.scheduler_enabled),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            minutes_to_payment_timeout: 1,
            scheduler_interval: Duration::from_millis(5000),
            scheduler_enabled: true,
            database_url: None,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
