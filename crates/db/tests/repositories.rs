//! Repository round-trips against a fresh, migrated database per test.

use genstudio_db::models::generation::CreateGeneration;
use genstudio_db::models::user::{CreateUser, User};
use genstudio_db::repositories::{GenerationRepo, UserRepo};
use sqlx::SqlitePool;

async fn create_user(pool: &SqlitePool, email: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

fn generation_for(user_id: i64, prompt: &str) -> CreateGeneration {
    CreateGeneration {
        user_id,
        prompt: prompt.to_string(),
        style: "anime".to_string(),
        image_url: format!("/uploads/{prompt}.png"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn health_check_passes(pool: SqlitePool) {
    genstudio_db::health_check(&pool).await.unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn user_lookup_by_email_and_id(pool: SqlitePool) {
    let user = create_user(&pool, "someone@example.com").await;

    let by_email = UserRepo::find_by_email(&pool, "someone@example.com")
        .await
        .unwrap()
        .expect("user should be found by email");
    assert_eq!(by_email.id, user.id);

    let by_id = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "someone@example.com");

    assert!(UserRepo::find_by_email(&pool, "nobody@example.com")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_email_is_a_unique_violation(pool: SqlitePool) {
    create_user(&pool, "dup@example.com").await;

    let err = UserRepo::create(
        &pool,
        &CreateUser {
            email: "dup@example.com".to_string(),
            password_hash: "x".to_string(),
        },
    )
    .await
    .unwrap_err();

    match err {
        sqlx::Error::Database(db_err) => assert!(db_err.is_unique_violation()),
        other => panic!("expected a database error, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn history_is_newest_first_and_limited(pool: SqlitePool) {
    let user = create_user(&pool, "history@example.com").await;

    let mut created = Vec::new();
    for i in 0..7 {
        let row = GenerationRepo::create(&pool, &generation_for(user.id, &format!("p{i}")))
            .await
            .unwrap();
        created.push(row);
    }

    let recent = GenerationRepo::list_recent_for_user(&pool, user.id, 5)
        .await
        .unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0].prompt, "p6");
    assert_eq!(recent[4].prompt, "p2");
    assert!(recent
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));

    let fetched = GenerationRepo::find_by_id(&pool, created[0].id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched, created[0]);
}

#[sqlx::test(migrations = "./migrations")]
async fn history_is_scoped_to_owner(pool: SqlitePool) {
    let alice = create_user(&pool, "alice@example.com").await;
    let bob = create_user(&pool, "bob@example.com").await;

    GenerationRepo::create(&pool, &generation_for(alice.id, "mine"))
        .await
        .unwrap();

    let bobs = GenerationRepo::list_recent_for_user(&pool, bob.id, 50)
        .await
        .unwrap();
    assert!(bobs.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn generation_serializes_with_client_field_names(pool: SqlitePool) {
    let user = create_user(&pool, "wire@example.com").await;
    let row = GenerationRepo::create(&pool, &generation_for(user.id, "wire"))
        .await
        .unwrap();

    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["userId"], user.id);
    assert_eq!(json["imageUrl"], "/uploads/wire.png");
    assert!(json["timestamp"].is_string());
    assert!(json.get("user_id").is_none());
}
