use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::Comment;
use crate::utils::CommentListParams;

// Input data for creating a new comment
pub struct CreateCommentData {
    pub author_id: i64,
    pub content: String,
    pub parent_id: Option<i64>,
}

const COMMENT_SELECT: &str = r#"
SELECT c.id, c.post_id, c.author_id, u.login AS author_login,
       c.parent_id, c.content, c.publish_date
FROM comments c
JOIN users u ON u.id = c.author_id
"#;

/// Inserts a new comment under a post.
pub async fn create_comment(
    pool: &SqlitePool,
    post_id: i64,
    data: CreateCommentData,
) -> Result<Comment, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO comments (post_id, author_id, parent_id, content, publish_date) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(post_id)
    .bind(data.author_id)
    .bind(data.parent_id)
    .bind(&data.content)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    match get_comment_by_id(pool, result.last_insert_rowid()).await? {
        Some(comment) => Ok(comment),
        None => Err(sqlx::Error::RowNotFound),
    }
}

pub async fn get_comment_by_id(
    pool: &SqlitePool,
    comment_id: i64,
) -> Result<Option<Comment>, sqlx::Error> {
    let sql = format!("{} WHERE c.id = ?", COMMENT_SELECT);
    sqlx::query_as::<_, Comment>(&sql)
        .bind(comment_id)
        .fetch_optional(pool)
        .await
}

/// Lists a post's comments. The sort column and direction come from the
/// whitelist in `CommentListParams`; nothing user-controlled reaches the
/// SQL text.
pub async fn get_comments_by_post(
    pool: &SqlitePool,
    post_id: i64,
    params: &CommentListParams,
) -> Result<Vec<Comment>, sqlx::Error> {
    let sql = format!(
        "{} WHERE c.post_id = ? ORDER BY {} {}, c.id ASC",
        COMMENT_SELECT,
        params.sort_column(),
        params.sort_direction()
    );
    sqlx::query_as::<_, Comment>(&sql)
        .bind(post_id)
        .fetch_all(pool)
        .await
}

pub async fn update_comment(
    pool: &SqlitePool,
    comment_id: i64,
    content: &str,
) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query("UPDATE comments SET content = ? WHERE id = ?")
        .bind(content)
        .bind(comment_id)
        .execute(pool)
        .await?;

    get_comment_by_id(pool, comment_id).await
}

/// Returns the number of rows affected.
pub async fn delete_comment(pool: &SqlitePool, comment_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(comment_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
