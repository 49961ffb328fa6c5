use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::ReactionEntry;

/// Likes and reposts share the same (user, post) existence contract; the
/// kind only selects the backing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKind {
    Like,
    Repost,
}

impl ReactionKind {
    fn table(&self) -> &'static str {
        match self {
            ReactionKind::Like => "post_likes",
            ReactionKind::Repost => "post_reposts",
        }
    }

    pub fn noun(&self) -> &'static str {
        match self {
            ReactionKind::Like => "Like",
            ReactionKind::Repost => "Repost",
        }
    }
}

pub async fn list_for_post(
    pool: &SqlitePool,
    kind: ReactionKind,
    post_id: i64,
) -> Result<Vec<ReactionEntry>, sqlx::Error> {
    let sql = format!(
        "SELECT r.user_id, u.login, r.created_at FROM {} r \
         JOIN users u ON u.id = r.user_id \
         WHERE r.post_id = ? ORDER BY r.created_at ASC, r.user_id ASC",
        kind.table()
    );
    sqlx::query_as::<_, ReactionEntry>(&sql)
        .bind(post_id)
        .fetch_all(pool)
        .await
}

pub async fn exists(
    pool: &SqlitePool,
    kind: ReactionKind,
    post_id: i64,
    user_id: i64,
) -> Result<bool, sqlx::Error> {
    let sql = format!(
        "SELECT 1 FROM {} WHERE post_id = ? AND user_id = ?",
        kind.table()
    );
    let row = sqlx::query(&sql)
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

pub async fn insert(
    pool: &SqlitePool,
    kind: ReactionKind,
    post_id: i64,
    user_id: i64,
) -> Result<(), sqlx::Error> {
    let sql = format!(
        "INSERT INTO {} (post_id, user_id, created_at) VALUES (?, ?, ?)",
        kind.table()
    );
    sqlx::query(&sql)
        .bind(post_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(pool)
        .await?;
    Ok(())
}

/// Returns the number of rows affected.
pub async fn delete(
    pool: &SqlitePool,
    kind: ReactionKind,
    post_id: i64,
    user_id: i64,
) -> Result<u64, sqlx::Error> {
    let sql = format!(
        "DELETE FROM {} WHERE post_id = ? AND user_id = ?",
        kind.table()
    );
    let result = sqlx::query(&sql)
        .bind(post_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
