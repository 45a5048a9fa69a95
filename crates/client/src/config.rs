use std::path::PathBuf;
use std::time::Duration;

use genstudio_core::generation::{clamp_history_limit, DEFAULT_HISTORY_LIMIT};
use genstudio_core::overload::{OverloadSimulator, DEFAULT_OVERLOAD_PROBABILITY};

use crate::coordinator::CoordinatorOptions;
use crate::retry::{RetryConfig, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API server (default: `http://localhost:5000`).
    pub api_url: String,
    /// Total attempts per generation (default: `3`).
    pub max_retries: u32,
    /// Fixed back-off between attempts in milliseconds (default: `2000`).
    pub retry_delay_ms: u64,
    /// Chance of a simulated overload before each attempt (default: `0.2`).
    pub overload_probability: f64,
    /// Number of history entries kept after each success (default: `5`).
    pub history_limit: i64,
    /// File holding the session token.
    pub token_path: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                  |
    /// |----------------------------------|--------------------------|
    /// | `GENSTUDIO_API_URL`              | `http://localhost:5000`  |
    /// | `GENSTUDIO_MAX_RETRIES`          | `3`                      |
    /// | `GENSTUDIO_RETRY_DELAY_MS`       | `2000`                   |
    /// | `GENSTUDIO_OVERLOAD_PROBABILITY` | `0.2`                    |
    /// | `GENSTUDIO_HISTORY_LIMIT`        | `5`                      |
    /// | `GENSTUDIO_TOKEN_PATH`           | `~/.genstudio/token`     |
    pub fn from_env() -> Self {
        let api_url = std::env::var("GENSTUDIO_API_URL")
            .unwrap_or_else(|_| "http://localhost:5000".into())
            .trim_end_matches('/')
            .to_string();

        let max_retries: u32 = std::env::var("GENSTUDIO_MAX_RETRIES")
            .unwrap_or_else(|_| DEFAULT_MAX_RETRIES.to_string())
            .parse()
            .expect("GENSTUDIO_MAX_RETRIES must be a valid u32");

        let retry_delay_ms: u64 = std::env::var("GENSTUDIO_RETRY_DELAY_MS")
            .unwrap_or_else(|_| (DEFAULT_RETRY_DELAY.as_millis() as u64).to_string())
            .parse()
            .expect("GENSTUDIO_RETRY_DELAY_MS must be a valid u64");

        let overload_probability: f64 = std::env::var("GENSTUDIO_OVERLOAD_PROBABILITY")
            .unwrap_or_else(|_| DEFAULT_OVERLOAD_PROBABILITY.to_string())
            .parse()
            .expect("GENSTUDIO_OVERLOAD_PROBABILITY must be a number between 0 and 1");

        let history_limit: i64 = std::env::var("GENSTUDIO_HISTORY_LIMIT")
            .unwrap_or_else(|_| DEFAULT_HISTORY_LIMIT.to_string())
            .parse()
            .expect("GENSTUDIO_HISTORY_LIMIT must be a valid i64");

        let token_path = std::env::var("GENSTUDIO_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_token_path());

        Self {
            api_url,
            max_retries,
            retry_delay_ms,
            overload_probability,
            history_limit: clamp_history_limit(history_limit),
            token_path,
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn coordinator_options(&self) -> CoordinatorOptions {
        CoordinatorOptions {
            retry: self.retry_config(),
            overload: OverloadSimulator::new(self.overload_probability),
            history_limit: self.history_limit,
        }
    }
}

fn default_token_path() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".genstudio").join("token"),
        None => PathBuf::from(".genstudio-token"),
    }
}
