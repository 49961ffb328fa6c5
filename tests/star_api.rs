// tests/star_api.rs

mod common;

use axum::http::{self, StatusCode};
use serde_json::json;
use sqlx::SqlitePool;
use usof_server::models::{Post, StarEntry};

use common::helpers::{
    body_json, create_test_app, create_test_category, create_test_post, create_test_user,
    error_message, send, send_json, set_stars_balance,
};

async fn balance_of(pool: &SqlitePool, user_id: i64) -> i64 {
    sqlx::query_scalar("SELECT stars_balance FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test]
async fn test_star_transfer_moves_balance_and_writes_ledger(pool: SqlitePool) {
    let app = create_test_app(pool.clone()).await;
    let giver = create_test_user(&pool, "giver", "USER").await;
    let receiver = create_test_user(&pool, "receiver", "USER").await;
    let cat = create_test_category(&pool, "Travel").await;
    let post_id = create_test_post(&app, receiver, "starworthy", &[cat]).await;
    set_stars_balance(&pool, giver, 10).await;

    let response = send_json(
        &app,
        http::Method::POST,
        &format!("/posts/{}/star", post_id),
        Some(giver),
        &json!({ "stars": 5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let entry: StarEntry = body_json(response).await;
    assert_eq!(entry.post_id, post_id);
    assert_eq!(entry.user_id, giver);
    assert_eq!(entry.stars, 5);

    assert_eq!(balance_of(&pool, giver).await, 5);
    assert_eq!(balance_of(&pool, receiver).await, 5);

    // Ledger row is present and the post aggregate reflects it.
    let ledger: (i64, i64, i64) = sqlx::query_as(
        "SELECT post_id, user_id, stars FROM post_stars WHERE post_id = ? AND user_id = ?",
    )
    .bind(post_id)
    .bind(giver)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(ledger, (post_id, giver, 5));

    let response = send(&app, http::Method::GET, &format!("/posts/{}", post_id), None).await;
    let post: Post = body_json(response).await;
    assert_eq!(post.stars, 5);
}

#[sqlx::test]
async fn test_star_amount_must_be_positive(pool: SqlitePool) {
    let app = create_test_app(pool.clone()).await;
    let giver = create_test_user(&pool, "giver", "USER").await;
    let receiver = create_test_user(&pool, "receiver", "USER").await;
    let cat = create_test_category(&pool, "Travel").await;
    let post_id = create_test_post(&app, receiver, "starworthy", &[cat]).await;
    set_stars_balance(&pool, giver, 10).await;

    for amount in [0, -3] {
        let response = send_json(
            &app,
            http::Method::POST,
            &format!("/posts/{}/star", post_id),
            Some(giver),
            &json!({ "stars": amount }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
    assert_eq!(balance_of(&pool, giver).await, 10);
}

#[sqlx::test]
async fn test_star_duplicate_pair_rejected(pool: SqlitePool) {
    let app = create_test_app(pool.clone()).await;
    let giver = create_test_user(&pool, "giver", "USER").await;
    let receiver = create_test_user(&pool, "receiver", "USER").await;
    let cat = create_test_category(&pool, "Travel").await;
    let post_id = create_test_post(&app, receiver, "starworthy", &[cat]).await;
    set_stars_balance(&pool, giver, 10).await;

    let response = send_json(
        &app,
        http::Method::POST,
        &format!("/posts/{}/star", post_id),
        Some(giver),
        &json!({ "stars": 2 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send_json(
        &app,
        http::Method::POST,
        &format!("/posts/{}/star", post_id),
        Some(giver),
        &json!({ "stars": 2 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(balance_of(&pool, giver).await, 8);
    assert_eq!(balance_of(&pool, receiver).await, 2);
}

#[sqlx::test]
async fn test_star_insufficient_balance(pool: SqlitePool) {
    let app = create_test_app(pool.clone()).await;
    let giver = create_test_user(&pool, "giver", "USER").await;
    let receiver = create_test_user(&pool, "receiver", "USER").await;
    let cat = create_test_category(&pool, "Travel").await;
    let post_id = create_test_post(&app, receiver, "starworthy", &[cat]).await;
    set_stars_balance(&pool, giver, 3).await;

    let response = send_json(
        &app,
        http::Method::POST,
        &format!("/posts/{}/star", post_id),
        Some(giver),
        &json!({ "stars": 5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "Insufficient stars");

    // Nothing moved, no ledger row.
    assert_eq!(balance_of(&pool, giver).await, 3);
    assert_eq!(balance_of(&pool, receiver).await, 0);
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post_stars WHERE post_id = ?")
        .bind(post_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test]
async fn test_star_own_post_rejected(pool: SqlitePool) {
    let app = create_test_app(pool.clone()).await;
    let author = create_test_user(&pool, "author1", "USER").await;
    let cat = create_test_category(&pool, "Travel").await;
    let post_id = create_test_post(&app, author, "mine", &[cat]).await;
    set_stars_balance(&pool, author, 10).await;

    let response = send_json(
        &app,
        http::Method::POST,
        &format!("/posts/{}/star", post_id),
        Some(author),
        &json!({ "stars": 5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(balance_of(&pool, author).await, 10);
}

#[sqlx::test]
async fn test_star_missing_post_rejected(pool: SqlitePool) {
    let app = create_test_app(pool.clone()).await;
    let giver = create_test_user(&pool, "giver", "USER").await;
    set_stars_balance(&pool, giver, 10).await;

    let response = send_json(
        &app,
        http::Method::POST,
        "/posts/9999/star",
        Some(giver),
        &json!({ "stars": 5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(balance_of(&pool, giver).await, 10);
}
