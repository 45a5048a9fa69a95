//! HTTP-level integration tests for the generation and history endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_multipart_auth, signup_token, Part};
use genstudio_core::generation::MAX_UPLOAD_BYTES;
use genstudio_core::overload::OverloadSimulator;
use sqlx::SqlitePool;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-data";

fn generation_parts<'a>(prompt: &'a str, style: &'a str, data: &'a [u8]) -> Vec<Part<'a>> {
    vec![
        Part::Text("prompt", prompt),
        Part::Text("style", style),
        Part::File {
            name: "file",
            file_name: "input.png",
            content_type: "image/png",
            data,
        },
    ]
}

// ---------------------------------------------------------------------------
// Generate
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn generate_stores_upload_and_returns_record(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let token = signup_token(common::build_test_app(pool.clone(), dir.path()), "g@example.com").await;

    let response = post_multipart_auth(
        common::build_test_app(pool.clone(), dir.path()),
        "/api/generations/generate",
        &generation_parts("a lighthouse at dusk", "watercolor", PNG_BYTES),
        Some(&token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["prompt"], "a lighthouse at dusk");
    assert_eq!(json["style"], "watercolor");
    assert!(json["id"].is_number());
    assert!(json["userId"].is_number());
    assert!(json["timestamp"].is_string());

    let image_url = json["imageUrl"].as_str().unwrap().to_string();
    assert!(image_url.starts_with("/uploads/gen-"));
    assert!(image_url.ends_with(".png"));

    let file_name = image_url.trim_start_matches("/uploads/");
    let stored = std::fs::read(dir.path().join(file_name)).unwrap();
    assert_eq!(stored, PNG_BYTES);

    // The stored file is served back under its public URL.
    let served = get(common::build_test_app(pool, dir.path()), &image_url).await;
    assert_eq!(served.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn generate_requires_authentication(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, dir.path());

    let response = post_multipart_auth(
        app,
        "/api/generations/generate",
        &generation_parts("a cat", "anime", PNG_BYTES),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "No token");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn generate_reports_overload_with_sentinel(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let token = signup_token(common::build_test_app(pool.clone(), dir.path()), "o@example.com").await;
    let app = common::build_test_app_with_overload(pool.clone(), dir.path(), OverloadSimulator::always());

    let response = post_multipart_auth(
        app,
        "/api/generations/generate",
        &generation_parts("a cat", "anime", PNG_BYTES),
        Some(&token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["message"], "MODEL_OVERLOADED");
    assert_eq!(json["success"], false);

    // Nothing was recorded.
    let history = get_auth(
        common::build_test_app(pool, dir.path()),
        "/api/generations/getGenerate",
        &token,
    )
    .await;
    assert_eq!(body_json(history).await.as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn generate_rejects_blank_prompt(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let token = signup_token(common::build_test_app(pool.clone(), dir.path()), "p@example.com").await;

    let response = post_multipart_auth(
        common::build_test_app(pool, dir.path()),
        "/api/generations/generate",
        &generation_parts("   ", "anime", PNG_BYTES),
        Some(&token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Prompt is required");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn generate_rejects_unknown_style(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let token = signup_token(common::build_test_app(pool.clone(), dir.path()), "s@example.com").await;

    let response = post_multipart_auth(
        common::build_test_app(pool, dir.path()),
        "/api/generations/generate",
        &generation_parts("a cat", "cubism", PNG_BYTES),
        Some(&token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = body_json(response).await["message"].as_str().unwrap().to_string();
    assert!(message.starts_with("Unknown style 'cubism'"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn generate_requires_file(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let token = signup_token(common::build_test_app(pool.clone(), dir.path()), "f@example.com").await;

    let response = post_multipart_auth(
        common::build_test_app(pool, dir.path()),
        "/api/generations/generate",
        &[Part::Text("prompt", "a cat"), Part::Text("style", "anime")],
        Some(&token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "File is required");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn generate_rejects_non_image_upload(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let token = signup_token(common::build_test_app(pool.clone(), dir.path()), "t@example.com").await;

    let parts = [
        Part::Text("prompt", "a cat"),
        Part::Text("style", "anime"),
        Part::File {
            name: "file",
            file_name: "notes.txt",
            content_type: "text/plain",
            data: b"hello",
        },
    ];
    let response = post_multipart_auth(
        common::build_test_app(pool, dir.path()),
        "/api/generations/generate",
        &parts,
        Some(&token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Invalid file type. Only JPEG and PNG are allowed."
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn generate_rejects_oversized_upload(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let token = signup_token(common::build_test_app(pool.clone(), dir.path()), "big@example.com").await;

    let data = vec![0u8; 11 * 1024 * 1024];
    let response = post_multipart_auth(
        common::build_test_app(pool, dir.path()),
        "/api/generations/generate",
        &generation_parts("a cat", "anime", &data),
        Some(&token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = body_json(response).await["message"].as_str().unwrap().to_string();
    assert!(message.contains("exceeds 10MB"), "unexpected message: {message}");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn generate_accepts_upload_exactly_at_limit(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let token = signup_token(common::build_test_app(pool.clone(), dir.path()), "edge@example.com").await;

    let data = vec![0u8; MAX_UPLOAD_BYTES];
    let response = post_multipart_auth(
        common::build_test_app(pool, dir.path()),
        "/api/generations/generate",
        &generation_parts("a cat", "realistic", &data),
        Some(&token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

async fn generate_n(pool: &SqlitePool, dir: &std::path::Path, token: &str, n: usize) {
    for i in 0..n {
        let prompt = format!("prompt {i}");
        let response = post_multipart_auth(
            common::build_test_app(pool.clone(), dir),
            "/api/generations/generate",
            &generation_parts(&prompt, "anime", PNG_BYTES),
            Some(token),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn history_defaults_to_five_newest_first(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let token = signup_token(common::build_test_app(pool.clone(), dir.path()), "h@example.com").await;
    generate_n(&pool, dir.path(), &token, 7).await;

    let response = get_auth(
        common::build_test_app(pool, dir.path()),
        "/api/generations/getGenerate",
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let prompts: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["prompt"].as_str().unwrap())
        .collect();
    assert_eq!(
        prompts,
        ["prompt 6", "prompt 5", "prompt 4", "prompt 3", "prompt 2"]
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn history_honours_explicit_limit(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let token = signup_token(common::build_test_app(pool.clone(), dir.path()), "l@example.com").await;
    generate_n(&pool, dir.path(), &token, 3).await;

    let response = get_auth(
        common::build_test_app(pool, dir.path()),
        "/api/generations/getGenerate?limit=2",
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn history_rejects_out_of_range_limits(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let token = signup_token(common::build_test_app(pool.clone(), dir.path()), "r@example.com").await;

    for limit in ["0", "51", "-1"] {
        let response = get_auth(
            common::build_test_app(pool.clone(), dir.path()),
            &format!("/api/generations/getGenerate?limit={limit}"),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "limit={limit}");
        assert_eq!(
            body_json(response).await["message"],
            "Limit must be between 1 and 50"
        );
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn history_is_scoped_to_caller(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let alice = signup_token(common::build_test_app(pool.clone(), dir.path()), "alice@example.com").await;
    let bob = signup_token(common::build_test_app(pool.clone(), dir.path()), "bob@example.com").await;
    generate_n(&pool, dir.path(), &alice, 2).await;

    let response = get_auth(
        common::build_test_app(pool, dir.path()),
        "/api/generations/getGenerate",
        &bob,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn history_requires_authentication(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let response = get(
        common::build_test_app(pool, dir.path()),
        "/api/generations/getGenerate",
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
