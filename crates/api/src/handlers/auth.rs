//! Handlers for the `/auth` resource (signup, login, logout, verify).

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use genstudio_core::credentials::Credentials;
use genstudio_core::error::CoreError;
use genstudio_db::models::user::{CreateUser, UserInfo};
use genstudio_db::repositories::UserRepo;
use serde::Serialize;
use serde_json::json;

use crate::auth::jwt::generate_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::authenticate;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Successful signup/login response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub message: String,
    pub token: String,
}

/// Plain acknowledgment.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response for a valid token on `GET /auth/verify`.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: UserInfo,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/signup
///
/// Create an account and return a token immediately.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    input.check()?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create = CreateUser {
        email: input.email.trim().to_string(),
        password_hash,
    };
    let user = match UserRepo::create(&state.pool, &create).await {
        Ok(user) => user,
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(AppError::BadRequest("User already exists".into()));
        }
        Err(e) => return Err(e.into()),
    };

    let token = generate_token(user.id, &user.email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            message: "User created successfully".into(),
            token,
        }),
    ))
}

/// POST /api/auth/login
///
/// Authenticate with email + password. Unknown emails and wrong passwords
/// produce the same 401 so accounts cannot be enumerated.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> AppResult<Json<TokenResponse>> {
    input.check()?;

    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid credentials".into()));

    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::debug!(user_id = user.id, "Rejected login with wrong password");
        return Err(invalid());
    }

    let token = generate_token(user.id, &user.email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(TokenResponse {
        message: "Login successful".into(),
        token,
    }))
}

/// POST /api/auth/logout
///
/// Tokens are self-contained, so this only acknowledges the request; the
/// client discards its copy.
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Logged out successfully".into(),
    })
}

/// GET /api/auth/verify
///
/// Report whether the bearer token is still valid. Failures answer
/// `{ "valid": false, "message": ... }` with 401 instead of the usual error
/// envelope.
pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match authenticate(&headers, &state.config.jwt) {
        Ok(claims) => Json(VerifyResponse {
            valid: true,
            user: UserInfo {
                id: claims.sub,
                email: claims.email,
            },
        })
        .into_response(),
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "valid": false, "message": "Invalid or expired token" })),
        )
            .into_response(),
    }
}
