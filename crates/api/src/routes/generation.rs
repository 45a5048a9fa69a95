//! Route definitions for the `/generations` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use genstudio_core::generation::MAX_UPLOAD_BYTES;

use crate::handlers::generation;
use crate::state::AppState;

/// Room for the multipart framing and text fields around the image.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Routes mounted at `/generations`.
///
/// ```text
/// POST /generate      -> generate (multipart)
/// GET  /getGenerate   -> history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/generate",
            post(generation::generate)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES)),
        )
        .route("/getGenerate", get(generation::history))
}
