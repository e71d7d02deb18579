//! Console configuration.
//!
//! Everything is env-driven. The defaults match the deployed behavior:
//! 10 second refresh cadence, 5 second reconnect delay, 30 second request
//! timeout. The intervals accept millisecond overrides so tests and local
//! development can run tighter loops.

use std::time::Duration;

use anyhow::{Context, Result};

/// Console configuration (env-driven).
#[derive(Debug, Clone)]
pub struct Config {
    /// Placement API base URL (example: http://localhost:5000/api).
    pub api_url: String,

    /// Push channel URL (example: ws://localhost:5000/live).
    pub push_url: String,

    /// Interval between full refreshes.
    pub refresh_interval: Duration,

    /// Delay before the single scheduled reconnect attempt.
    pub reconnect_delay: Duration,

    /// Per-request timeout for API calls.
    pub request_timeout: Duration,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".to_string(),
            push_url: "ws://localhost:5000/live".to_string(),
            refresh_interval: Duration::from_secs(10),
            reconnect_delay: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let api_url = std::env::var("TUTORLINK_API_URL").unwrap_or(defaults.api_url);
        let push_url = std::env::var("TUTORLINK_PUSH_URL").unwrap_or(defaults.push_url);

        let refresh_interval = read_millis("TUTORLINK_REFRESH_INTERVAL_MS")?
            .unwrap_or(defaults.refresh_interval);
        let reconnect_delay =
            read_millis("TUTORLINK_RECONNECT_DELAY_MS")?.unwrap_or(defaults.reconnect_delay);
        let request_timeout =
            read_millis("TUTORLINK_REQUEST_TIMEOUT_MS")?.unwrap_or(defaults.request_timeout);

        let log_level =
            std::env::var("TUTORLINK_LOG_LEVEL").unwrap_or(defaults.log_level);

        Ok(Self {
            api_url,
            push_url,
            refresh_interval,
            reconnect_delay,
            request_timeout,
            log_level,
        })
    }
}

fn read_millis(var: &str) -> Result<Option<Duration>> {
    let ms: Option<u64> = std::env::var(var)
        .ok()
        .map(|v| v.parse())
        .transpose()
        .with_context(|| format!("{} must be an integer (milliseconds).", var))?;
    Ok(ms.map(|ms| Duration::from_millis(ms.max(50))))
}
