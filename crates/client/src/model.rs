//! Request and result types exchanged with the generation endpoint.

use std::path::Path;

use chrono::{DateTime, Utc};
use genstudio_core::generation::{validate_image_upload, validate_prompt, Style};
use genstudio_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Source image attached to a generation request.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing the MIME type from its extension.
    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ClientError::Validation(format!("Cannot read {}: {e}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, mime_for_path(path), bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Parameters of one generation. Immutable for the lifetime of an attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub style: Style,
    pub file: Option<UploadFile>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, style: Style, file: UploadFile) -> Self {
        Self {
            prompt: prompt.into(),
            style,
            file: Some(file),
        }
    }

    /// Apply the same input rules as the server, without any I/O.
    pub fn validate(&self) -> Result<&UploadFile, ClientError> {
        validate_prompt(&self.prompt)?;
        let file = self
            .file
            .as_ref()
            .ok_or_else(|| ClientError::Validation("File is required".into()))?;
        validate_image_upload(&file.mime_type, file.size())?;
        Ok(file)
    }
}

/// A completed generation as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub id: DbId,
    #[serde(rename = "userId")]
    pub user_id: DbId,
    pub prompt: String,
    pub style: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}
