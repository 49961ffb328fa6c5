// tests/user_api.rs

mod common;

use axum::http::{self, StatusCode};
use sqlx::SqlitePool;
use usof_server::models::{Author, Role, UserProfile};

use common::helpers::{body_json, create_test_app, create_test_user, send, set_stars_balance};

#[sqlx::test]
async fn test_get_user_profile(pool: SqlitePool) {
    let app = create_test_app(pool.clone()).await;
    let user = create_test_user(&pool, "someone", "USER").await;
    set_stars_balance(&pool, user, 7).await;

    let response = send(&app, http::Method::GET, &format!("/users/{}", user), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let profile: UserProfile = body_json(response).await;
    assert_eq!(profile.id, user);
    assert_eq!(profile.login, "someone");
    assert_eq!(profile.role, Role::User);
    assert_eq!(profile.stars_balance, 7);
    assert_eq!(profile.followers_count, 0);
    assert_eq!(profile.following_count, 0);

    let response = send(&app, http::Method::GET, "/users/9999", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn test_subscribe_and_unsubscribe(pool: SqlitePool) {
    let app = create_test_app(pool.clone()).await;
    let follower = create_test_user(&pool, "follower", "USER").await;
    let followed = create_test_user(&pool, "followed", "USER").await;
    let uri = format!("/users/{}/subscribe", followed);

    let response = send(&app, http::Method::POST, &uri, Some(follower)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Duplicate subscription is a bad request.
    let response = send(&app, http::Method::POST, &uri, Some(follower)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Counts are visible on both profiles.
    let response = send(&app, http::Method::GET, &format!("/users/{}", followed), None).await;
    let profile: UserProfile = body_json(response).await;
    assert_eq!(profile.followers_count, 1);

    let response = send(&app, http::Method::GET, &format!("/users/{}", follower), None).await;
    let profile: UserProfile = body_json(response).await;
    assert_eq!(profile.following_count, 1);

    let response = send(
        &app,
        http::Method::GET,
        &format!("/users/{}/following", follower),
        None,
    )
    .await;
    let following: Vec<Author> = body_json(response).await;
    assert_eq!(following.len(), 1);
    assert_eq!(following[0].id, followed);

    let response = send(
        &app,
        http::Method::GET,
        &format!("/users/{}/followers", followed),
        None,
    )
    .await;
    let followers: Vec<Author> = body_json(response).await;
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].id, follower);

    let response = send(&app, http::Method::DELETE, &uri, Some(follower)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Removing an absent subscription is a bad request.
    let response = send(&app, http::Method::DELETE, &uri, Some(follower)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn test_subscribe_to_self_rejected(pool: SqlitePool) {
    let app = create_test_app(pool.clone()).await;
    let user = create_test_user(&pool, "loner", "USER").await;

    let response = send(
        &app,
        http::Method::POST,
        &format!("/users/{}/subscribe", user),
        Some(user),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn test_subscribe_to_missing_user_rejected(pool: SqlitePool) {
    let app = create_test_app(pool.clone()).await;
    let user = create_test_user(&pool, "follower", "USER").await;

    let response = send(&app, http::Method::POST, "/users/9999/subscribe", Some(user)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, http::Method::POST, "/users/9999/subscribe", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
