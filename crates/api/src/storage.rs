//! Local-disk storage for uploaded source images.
//!
//! Files land in a single flat directory that is also served statically under
//! `/uploads`. Names are generated server-side; the client's filename is only
//! ever used for logging.

use std::path::{Path, PathBuf};

use genstudio_core::generation::extension_for_mime;
use rand::Rng;

/// URL prefix under which stored uploads are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Handle to the upload directory.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    root: PathBuf,
}

impl UploadStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the upload directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Write `data` under a fresh `gen-<millis>-<random>.<ext>` name and
    /// return that file name.
    pub async fn store(&self, data: &[u8], mime_type: &str) -> std::io::Result<String> {
        self.ensure_dir().await?;

        let file_name = format!(
            "gen-{}-{}.{}",
            chrono::Utc::now().timestamp_millis(),
            rand::rng().random_range(0..1_000_000_000u32),
            extension_for_mime(mime_type),
        );
        tokio::fs::write(self.root.join(&file_name), data).await?;
        Ok(file_name)
    }

    /// Public URL of a stored file.
    pub fn public_url(file_name: &str) -> String {
        format!("{UPLOADS_URL_PREFIX}/{file_name}")
    }
}
