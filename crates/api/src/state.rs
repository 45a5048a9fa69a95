use std::sync::Arc;

use genstudio_core::overload::OverloadSimulator;

use crate::config::ServerConfig;
use crate::storage::UploadStorage;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: genstudio_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Where uploaded source images are written.
    pub storage: UploadStorage,
    /// Simulated model overload applied to every generation request.
    pub overload: OverloadSimulator,
}

impl AppState {
    /// Build state from configuration, deriving storage and overload
    /// simulation from the configured values.
    pub fn new(pool: genstudio_db::DbPool, config: ServerConfig) -> Self {
        let storage = UploadStorage::new(config.upload_dir.clone());
        let overload = OverloadSimulator::new(config.overload_probability);
        Self {
            pool,
            config: Arc::new(config),
            storage,
            overload,
        }
    }
}
