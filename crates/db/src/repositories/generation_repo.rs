//! Repository for the `generations` table.

use chrono::Utc;
use genstudio_core::types::DbId;

use crate::models::generation::{CreateGeneration, Generation};
use crate::DbPool;

const COLUMNS: &str = "id, user_id, prompt, style, image_url, created_at";

/// Provides persistence for completed generations.
pub struct GenerationRepo;

impl GenerationRepo {
    /// Record a completed generation, stamped with the current time.
    pub async fn create(
        pool: &DbPool,
        input: &CreateGeneration,
    ) -> Result<Generation, sqlx::Error> {
        let query = format!(
            "INSERT INTO generations (user_id, prompt, style, image_url, created_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Generation>(&query)
            .bind(input.user_id)
            .bind(&input.prompt)
            .bind(&input.style)
            .bind(&input.image_url)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Generation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generations WHERE id = ?");
        sqlx::query_as::<_, Generation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The caller's most recent generations, newest first.
    ///
    /// `limit` is expected to be validated by the caller; rows with equal
    /// timestamps fall back to insertion order.
    pub async fn list_recent_for_user(
        pool: &DbPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<Generation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generations
             WHERE user_id = ?
             ORDER BY created_at DESC, id DESC
             LIMIT ?"
        );
        sqlx::query_as::<_, Generation>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
