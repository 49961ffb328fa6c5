// tests/reaction_api.rs

mod common;

use axum::http::{self, StatusCode};
use sqlx::SqlitePool;
use usof_server::models::ReactionEntry;

use common::helpers::{
    body_json, create_test_app, create_test_category, create_test_post, create_test_user, send,
};

#[sqlx::test]
async fn test_like_create_duplicate_and_delete(pool: SqlitePool) {
    let app = create_test_app(pool.clone()).await;
    let author = create_test_user(&pool, "author1", "USER").await;
    let fan = create_test_user(&pool, "fan", "USER").await;
    let cat = create_test_category(&pool, "Travel").await;
    let post_id = create_test_post(&app, author, "a post", &[cat]).await;
    let like_uri = format!("/posts/{}/like", post_id);

    let response = send(&app, http::Method::POST, &like_uri, Some(fan)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // The same (user, post) pair cannot like twice.
    let response = send(&app, http::Method::POST, &like_uri, Some(fan)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, http::Method::GET, &like_uri, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let entries: Vec<ReactionEntry> = body_json(response).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].user_id, fan);
    assert_eq!(entries[0].login, "fan");

    let response = send(&app, http::Method::DELETE, &like_uri, Some(fan)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Deleting an absent like is a bad request.
    let response = send(&app, http::Method::DELETE, &like_uri, Some(fan)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, http::Method::GET, &like_uri, None).await;
    let entries: Vec<ReactionEntry> = body_json(response).await;
    assert!(entries.is_empty());
}

#[sqlx::test]
async fn test_repost_create_duplicate_and_delete(pool: SqlitePool) {
    let app = create_test_app(pool.clone()).await;
    let author = create_test_user(&pool, "author1", "USER").await;
    let fan = create_test_user(&pool, "fan", "USER").await;
    let cat = create_test_category(&pool, "Travel").await;
    let post_id = create_test_post(&app, author, "a post", &[cat]).await;
    let repost_uri = format!("/posts/{}/repost", post_id);

    let response = send(&app, http::Method::POST, &repost_uri, Some(fan)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(&app, http::Method::POST, &repost_uri, Some(fan)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, http::Method::GET, &repost_uri, None).await;
    let entries: Vec<ReactionEntry> = body_json(response).await;
    assert_eq!(entries.len(), 1);

    let response = send(&app, http::Method::DELETE, &repost_uri, Some(fan)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, http::Method::DELETE, &repost_uri, Some(fan)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn test_likes_and_reposts_are_independent(pool: SqlitePool) {
    let app = create_test_app(pool.clone()).await;
    let author = create_test_user(&pool, "author1", "USER").await;
    let fan = create_test_user(&pool, "fan", "USER").await;
    let cat = create_test_category(&pool, "Travel").await;
    let post_id = create_test_post(&app, author, "a post", &[cat]).await;

    let response = send(
        &app,
        http::Method::POST,
        &format!("/posts/{}/like", post_id),
        Some(fan),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Liking does not repost.
    let response = send(
        &app,
        http::Method::GET,
        &format!("/posts/{}/repost", post_id),
        None,
    )
    .await;
    let entries: Vec<ReactionEntry> = body_json(response).await;
    assert!(entries.is_empty());

    let response = send(
        &app,
        http::Method::POST,
        &format!("/posts/{}/repost", post_id),
        Some(fan),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test]
async fn test_reaction_on_missing_post(pool: SqlitePool) {
    let app = create_test_app(pool.clone()).await;
    let fan = create_test_user(&pool, "fan", "USER").await;

    let response = send(&app, http::Method::POST, "/posts/9999/like", Some(fan)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, http::Method::GET, "/posts/9999/like", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn test_reaction_requires_auth(pool: SqlitePool) {
    let app = create_test_app(pool.clone()).await;
    let author = create_test_user(&pool, "author1", "USER").await;
    let cat = create_test_category(&pool, "Travel").await;
    let post_id = create_test_post(&app, author, "a post", &[cat]).await;

    let response = send(
        &app,
        http::Method::POST,
        &format!("/posts/{}/like", post_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
