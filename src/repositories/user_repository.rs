use sqlx::SqlitePool;

use crate::auth::AuthenticatedUser;
use crate::models::UserProfile;

/// Resolves an identity header to an account, loading only what the
/// extractor needs.
pub async fn get_auth_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Option<AuthenticatedUser>, sqlx::Error> {
    sqlx::query_as::<_, AuthenticatedUser>("SELECT id, role FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Fetches a user profile with follower/following counts.
pub async fn get_profile(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(
        r#"
        SELECT
            u.id, u.login, u.full_name, u.avatar, u.role, u.stars_balance, u.created_at,
            (SELECT COUNT(*) FROM subscriptions s WHERE s.following_id = u.id) AS followers_count,
            (SELECT COUNT(*) FROM subscriptions s WHERE s.follower_id = u.id) AS following_count
        FROM users u
        WHERE u.id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn user_exists(pool: &SqlitePool, user_id: i64) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}
