// tests/common/helpers.rs
//! Shared helper functions for integration tests

use axum::{
    body::Body,
    http::{self, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use tower::ServiceExt;
use usof_server::{create_router, models::Post};
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";

// Function to generate a random boundary string
pub fn generate_boundary() -> String {
    format!("----WebKitFormBoundary{}", Uuid::new_v4().simple())
}

pub async fn create_test_app(pool: SqlitePool) -> Router {
    // Generated image filenames never collide, so tests can share one dir.
    let test_upload_dir = "./test_uploads".to_string();
    let test_base_url = "/uploads".to_string();
    create_router(pool, test_upload_dir, test_base_url)
}

pub async fn create_test_user(pool: &SqlitePool, login: &str, role: &str) -> i64 {
    sqlx::query(
        "INSERT INTO users (login, full_name, email, role, stars_balance, created_at) \
         VALUES (?, ?, ?, ?, 0, ?)",
    )
    .bind(login)
    .bind(format!("{} Test", login))
    .bind(format!("{}@example.com", login))
    .bind(role)
    .bind(Utc::now())
    .execute(pool)
    .await
    .expect("failed to insert test user")
    .last_insert_rowid()
}

pub async fn set_stars_balance(pool: &SqlitePool, user_id: i64, balance: i64) {
    sqlx::query("UPDATE users SET stars_balance = ? WHERE id = ?")
        .bind(balance)
        .bind(user_id)
        .execute(pool)
        .await
        .expect("failed to set stars balance");
}

pub async fn create_test_category(pool: &SqlitePool, title: &str) -> i64 {
    sqlx::query("INSERT INTO categories (title, description) VALUES (?, ?)")
        .bind(title)
        .bind("...")
        .execute(pool)
        .await
        .expect("failed to insert test category")
        .last_insert_rowid()
}

/// One part of a multipart form body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

pub fn build_multipart_body(boundary: &str, parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}

pub async fn body_json<T: DeserializeOwned>(response: Response) -> T {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap_or_else(|e| {
        panic!(
            "failed to deserialize body: {}: {}",
            e,
            String::from_utf8_lossy(&body)
        )
    })
}

/// Extracts the `message` field of an error envelope.
pub async fn error_message(response: Response) -> String {
    let value: serde_json::Value = body_json(response).await;
    value["message"]
        .as_str()
        .expect("error body without message field")
        .to_string()
}

/// Creates a post through the API and returns its id.
pub async fn create_test_post(
    app: &Router,
    user_id: i64,
    title: &str,
    category_ids: &[i64],
) -> i64 {
    let cats: Vec<String> = category_ids.iter().map(|id| id.to_string()).collect();
    let mut parts = vec![
        Part::Text("title", title),
        Part::Text("content", "Test post content"),
    ];
    for cat in &cats {
        parts.push(Part::Text("categories", cat));
    }

    let boundary = generate_boundary();
    let body = build_multipart_body(&boundary, &parts);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(http::Method::POST)
                .uri("/posts")
                .header(USER_ID_HEADER, user_id.to_string())
                .header(
                    http::header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(
        status,
        StatusCode::CREATED,
        "Failed to create post: {}",
        String::from_utf8_lossy(&body)
    );
    let post: Post = serde_json::from_slice(&body).expect("failed to deserialize post in helper");
    post.id
}

/// Sends an empty-bodied request with an optional identity header.
pub async fn send(
    app: &Router,
    method: http::Method,
    uri: &str,
    user_id: Option<i64>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user_id {
        builder = builder.header(USER_ID_HEADER, id.to_string());
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Sends a JSON-bodied request with an optional identity header.
pub async fn send_json(
    app: &Router,
    method: http::Method,
    uri: &str,
    user_id: Option<i64>,
    payload: &serde_json::Value,
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
    if let Some(id) = user_id {
        builder = builder.header(USER_ID_HEADER, id.to_string());
    }
    app.clone()
        .oneshot(builder.body(Body::from(payload.to_string())).unwrap())
        .await
        .unwrap()
}

/// Sends a multipart request with an identity header.
pub async fn send_multipart(
    app: &Router,
    method: http::Method,
    uri: &str,
    user_id: i64,
    parts: &[Part<'_>],
) -> Response {
    let boundary = generate_boundary();
    let body = build_multipart_body(&boundary, parts);
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(USER_ID_HEADER, user_id.to_string())
                .header(
                    http::header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}
