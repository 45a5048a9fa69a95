use std::path::PathBuf;

use genstudio_core::overload::DEFAULT_OVERLOAD_PROBABILITY;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// SQLite connection URL (default: `sqlite://genstudio.db`).
    pub database_url: String,
    /// Directory uploaded images are written to and served from.
    pub upload_dir: PathBuf,
    /// Chance that a generation request is answered with a simulated overload.
    pub overload_probability: f64,
    /// Simulated model processing time in milliseconds.
    pub generation_delay_ms: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `5000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DATABASE_URL`         | `sqlite://genstudio.db`    |
    /// | `UPLOAD_DIR`           | `uploads`                  |
    /// | `OVERLOAD_PROBABILITY` | `0.2`                      |
    /// | `GENERATION_DELAY_MS`  | `1000`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://genstudio.db".into());

        let upload_dir = PathBuf::from(
            std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()),
        );

        let overload_probability: f64 = std::env::var("OVERLOAD_PROBABILITY")
            .unwrap_or_else(|_| DEFAULT_OVERLOAD_PROBABILITY.to_string())
            .parse()
            .expect("OVERLOAD_PROBABILITY must be a number between 0 and 1");

        let generation_delay_ms: u64 = std::env::var("GENERATION_DELAY_MS")
            .unwrap_or_else(|_| "1000".into())
            .parse()
            .expect("GENERATION_DELAY_MS must be a valid u64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            upload_dir,
            overload_probability,
            generation_delay_ms,
            jwt,
        }
    }
}
