pub mod auth;
pub mod generation;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                       create account (public)
/// /auth/login                        issue token (public)
/// /auth/logout                       acknowledge logout
/// /auth/verify                       validate bearer token
///
/// /generations/generate              multipart generation (requires auth)
/// /generations/getGenerate?limit=N   recent history (requires auth)
///
/// /checkStatus                       liveness text
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/generations", generation::router())
        .route("/checkStatus", get(handlers::health::check_status))
}
