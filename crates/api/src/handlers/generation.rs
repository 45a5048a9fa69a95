//! Handlers for the `/generations` resource.
//!
//! Generation is simulated: the uploaded image is stored as-is after an
//! artificial processing delay, and a configurable fraction of requests is
//! rejected with the overload sentinel before any work happens.

use std::time::Duration;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use genstudio_core::error::CoreError;
use genstudio_core::generation::{
    validate_history_limit, validate_image_upload, validate_prompt, Style,
};
use genstudio_db::models::generation::{CreateGeneration, Generation};
use genstudio_db::repositories::GenerationRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::HistoryParams;
use crate::state::AppState;
use crate::storage::UploadStorage;

/// Response body for a successful generation.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    #[serde(flatten)]
    pub generation: Generation,
}

/// An uploaded file pulled out of the multipart body.
struct UploadedFile {
    file_name: String,
    content_type: String,
    data: Vec<u8>,
}

/// Text fields and file collected from the multipart body.
#[derive(Default)]
struct GenerateForm {
    prompt: Option<String>,
    style: Option<String>,
    file: Option<UploadedFile>,
}

/// POST /api/generations/generate
///
/// Multipart fields: `prompt`, `style`, `file` (JPEG/PNG, at most 10 MiB).
/// Answers 503 with `MODEL_OVERLOADED` when the simulated model is busy.
pub async fn generate(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<GenerateResponse>)> {
    if state.overload.should_overload() {
        tracing::warn!(user_id = user.user_id, "Simulated model overload");
        return Err(CoreError::ModelOverloaded.into());
    }

    let form = read_form(multipart).await?;

    let prompt = form.prompt.unwrap_or_default();
    validate_prompt(&prompt)?;
    let style: Style = form.style.unwrap_or_default().parse()?;

    let file = form
        .file
        .ok_or_else(|| CoreError::Validation("File is required".into()))?;
    validate_image_upload(&file.content_type, file.data.len())?;

    tokio::time::sleep(Duration::from_millis(state.config.generation_delay_ms)).await;

    let stored_name = state
        .storage
        .store(&file.data, &file.content_type)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

    let input = CreateGeneration {
        user_id: user.user_id,
        prompt,
        style: style.as_str().to_string(),
        image_url: UploadStorage::public_url(&stored_name),
    };
    let generation = GenerationRepo::create(&state.pool, &input).await?;

    tracing::info!(
        user_id = user.user_id,
        generation_id = generation.id,
        style = %style,
        original_name = %file.file_name,
        size_bytes = file.data.len(),
        "Generation completed",
    );

    Ok((
        StatusCode::CREATED,
        Json(GenerateResponse {
            success: true,
            generation,
        }),
    ))
}

/// GET /api/generations/getGenerate?limit=N
///
/// The caller's most recent generations, newest first. `limit` defaults to 5
/// and must be within 1..=50.
pub async fn history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<Vec<Generation>>> {
    let limit = validate_history_limit(params.limit)?;
    let generations =
        GenerationRepo::list_recent_for_user(&state.pool, user.user_id, limit).await?;
    Ok(Json(generations))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn read_form(mut multipart: Multipart) -> AppResult<GenerateForm> {
    let mut form = GenerateForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "prompt" => form.prompt = Some(field.text().await.map_err(multipart_error)?),
            "style" => form.style = Some(field.text().await.map_err(multipart_error)?),
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    data: data.to_vec(),
                });
            }
            _ => {} // ignore unknown fields
        }
    }

    Ok(form)
}

/// Oversized bodies are reported with the same message as the explicit
/// size check; other multipart failures become plain 400s.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Core(CoreError::Validation("File size exceeds 10MB limit".into()))
    } else {
        AppError::BadRequest(err.body_text())
    }
}
