//! Generation record model and DTOs.

use genstudio_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A completed generation from the `generations` table.
///
/// Serialized with the field names clients expect (`userId`, `imageUrl`,
/// `timestamp`).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Generation {
    pub id: DbId,
    #[serde(rename = "userId")]
    pub user_id: DbId,
    pub prompt: String,
    pub style: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "timestamp")]
    pub created_at: Timestamp,
}

/// DTO for recording a new generation.
#[derive(Debug, Clone)]
pub struct CreateGeneration {
    pub user_id: DbId,
    pub prompt: String,
    pub style: String,
    pub image_url: String,
}
