use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::Author;

pub async fn is_subscribed(
    pool: &SqlitePool,
    follower_id: i64,
    following_id: i64,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 FROM subscriptions WHERE follower_id = ? AND following_id = ?")
        .bind(follower_id)
        .bind(following_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

pub async fn subscribe(
    pool: &SqlitePool,
    follower_id: i64,
    following_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO subscriptions (follower_id, following_id, created_at) VALUES (?, ?, ?)")
        .bind(follower_id)
        .bind(following_id)
        .bind(Utc::now())
        .execute(pool)
        .await?;
    Ok(())
}

/// Returns the number of rows affected.
pub async fn unsubscribe(
    pool: &SqlitePool,
    follower_id: i64,
    following_id: i64,
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM subscriptions WHERE follower_id = ? AND following_id = ?")
            .bind(follower_id)
            .bind(following_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}

/// Users the given user follows.
pub async fn get_following(pool: &SqlitePool, user_id: i64) -> Result<Vec<Author>, sqlx::Error> {
    sqlx::query_as::<_, Author>(
        r#"
        SELECT u.id, u.login, u.full_name, u.avatar
        FROM users u
        JOIN subscriptions s ON s.following_id = u.id
        WHERE s.follower_id = ?
        ORDER BY u.login ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Users following the given user.
pub async fn get_followers(pool: &SqlitePool, user_id: i64) -> Result<Vec<Author>, sqlx::Error> {
    sqlx::query_as::<_, Author>(
        r#"
        SELECT u.id, u.login, u.full_name, u.avatar
        FROM users u
        JOIN subscriptions s ON s.follower_id = u.id
        WHERE s.following_id = ?
        ORDER BY u.login ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
