use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::models::{Author, Post, PostStatus};
use crate::utils::PageParams;

// Input data for creating a new post. Image files are already on disk;
// only their generated filenames are recorded here.
pub struct CreatePostData {
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub location: Option<String>,
    pub category_ids: Vec<i64>,
    pub image_filenames: Vec<String>,
}

// Input data for updating a post. `category_ids` carries replace-all
// semantics; absent scalar fields keep their value.
#[derive(Default)]
pub struct UpdatePostData {
    pub title: Option<String>,
    pub content: Option<String>,
    pub location: Option<String>,
    pub status: Option<PostStatus>,
    pub category_ids: Option<Vec<i64>>,
    pub add_image_filenames: Vec<String>,
    pub remove_image_filenames: Vec<String>,
}

/// Which slice of the feed a page is drawn from.
pub enum FeedScope {
    All,
    /// Posts by authors the given user follows.
    Following(i64),
    /// Posts associated with the given category.
    Category(i64),
}

// One row per post with every aggregate the feed needs. The image list is
// collapsed into a comma-joined string of distinct generated filenames
// (which never contain commas) and split apart in Rust.
const POST_SELECT: &str = r#"
SELECT
    p.id, p.title, p.content, p.location, p.status, p.publish_date,
    u.id AS author_id, u.login AS author_login,
    u.full_name AS author_full_name, u.avatar AS author_avatar,
    (SELECT COUNT(DISTINCT pl.user_id) FROM post_likes pl WHERE pl.post_id = p.id) AS likes_count,
    (SELECT COUNT(DISTINCT pr.user_id) FROM post_reposts pr WHERE pr.post_id = p.id) AS reposts_count,
    (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count,
    COALESCE((SELECT SUM(ps.stars) FROM post_stars ps WHERE ps.post_id = p.id), 0) AS stars,
    (SELECT GROUP_CONCAT(DISTINCT pi.filename) FROM post_images pi WHERE pi.post_id = p.id) AS image_filenames
FROM posts p
JOIN users u ON u.id = p.author_id
"#;

#[derive(FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    location: Option<String>,
    status: PostStatus,
    publish_date: DateTime<Utc>,
    author_id: i64,
    author_login: String,
    author_full_name: Option<String>,
    author_avatar: Option<String>,
    likes_count: i64,
    reposts_count: i64,
    comments_count: i64,
    stars: i64,
    image_filenames: Option<String>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            author: Author {
                id: row.author_id,
                login: row.author_login,
                full_name: row.author_full_name,
                avatar: row.author_avatar,
            },
            title: row.title,
            content: row.content,
            location: row.location,
            status: row.status,
            publish_date: row.publish_date,
            images: row
                .image_filenames
                .map(|joined| joined.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            likes_count: row.likes_count,
            reposts_count: row.reposts_count,
            comments_count: row.comments_count,
            stars: row.stars,
        }
    }
}

fn push_scope(qb: &mut QueryBuilder<'_, Sqlite>, scope: &FeedScope) {
    match scope {
        FeedScope::All => {}
        FeedScope::Following(follower_id) => {
            qb.push(
                " INNER JOIN subscriptions s ON s.following_id = p.author_id AND s.follower_id = ",
            );
            qb.push_bind(*follower_id);
        }
        FeedScope::Category(category_id) => {
            qb.push(" INNER JOIN post_categories pc ON pc.post_id = p.id AND pc.category_id = ");
            qb.push_bind(*category_id);
        }
    }
}

/// Fetches one page of the feed. The ORDER BY clause comes from the fixed
/// sort enum; scope joins and LIMIT/OFFSET are bound parameters.
pub async fn get_feed_page(
    pool: &SqlitePool,
    scope: &FeedScope,
    params: &PageParams,
) -> Result<Vec<Post>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(POST_SELECT);
    push_scope(&mut qb, scope);
    qb.push(" ORDER BY ");
    qb.push(params.sort().order_clause());
    qb.push(" LIMIT ");
    qb.push_bind(params.limit() as i64);
    qb.push(" OFFSET ");
    qb.push_bind(params.offset() as i64);

    let rows: Vec<PostRow> = qb.build_query_as().fetch_all(pool).await?;
    Ok(rows.into_iter().map(Post::from).collect())
}

/// Counts the posts the scope exposes, for the pagination envelope.
pub async fn count_feed(pool: &SqlitePool, scope: &FeedScope) -> Result<i64, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM posts p");
    push_scope(&mut qb, scope);
    qb.build_query_scalar().fetch_one(pool).await
}

/// Fetches a single post with the same aggregates as a feed row.
pub async fn get_post_by_id(pool: &SqlitePool, post_id: i64) -> Result<Option<Post>, sqlx::Error> {
    let sql = format!("{} WHERE p.id = ?", POST_SELECT);
    let row = sqlx::query_as::<_, PostRow>(&sql)
        .bind(post_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Post::from))
}

/// Author and status in one lookup, for the ownership/status gates.
pub async fn get_post_author_status(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Option<(i64, PostStatus)>, sqlx::Error> {
    sqlx::query_as::<_, (i64, PostStatus)>("SELECT author_id, status FROM posts WHERE id = ?")
        .bind(post_id)
        .fetch_optional(pool)
        .await
}

/// Inserts a post with its category associations and image rows as one
/// transaction.
pub async fn create_post(pool: &SqlitePool, data: CreatePostData) -> Result<Post, sqlx::Error> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "INSERT INTO posts (author_id, title, content, location, status, publish_date) \
         VALUES (?, ?, ?, ?, 'ACTIVE', ?)",
    )
    .bind(data.author_id)
    .bind(&data.title)
    .bind(&data.content)
    .bind(&data.location)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    let post_id = result.last_insert_rowid();

    for category_id in &data.category_ids {
        sqlx::query("INSERT INTO post_categories (post_id, category_id) VALUES (?, ?)")
            .bind(post_id)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;
    }

    for filename in &data.image_filenames {
        sqlx::query("INSERT INTO post_images (post_id, filename, created_at) VALUES (?, ?, ?)")
            .bind(post_id)
            .bind(filename)
            .bind(now)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    match get_post_by_id(pool, post_id).await? {
        Some(post) => Ok(post),
        None => Err(sqlx::Error::RowNotFound),
    }
}

/// Applies a post update in one transaction. Returns the filenames of image
/// rows actually removed so the caller can unlink them from disk after the
/// commit.
pub async fn update_post(
    pool: &SqlitePool,
    post_id: i64,
    data: UpdatePostData,
) -> Result<Vec<String>, sqlx::Error> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE posts SET title = COALESCE(?, title), content = COALESCE(?, content), \
         location = COALESCE(?, location), status = COALESCE(?, status) WHERE id = ?",
    )
    .bind(&data.title)
    .bind(&data.content)
    .bind(&data.location)
    .bind(data.status)
    .bind(post_id)
    .execute(&mut *tx)
    .await?;

    if let Some(category_ids) = &data.category_ids {
        // Replace-all: the previous associations are dropped wholesale.
        sqlx::query("DELETE FROM post_categories WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;
        for category_id in category_ids {
            sqlx::query("INSERT INTO post_categories (post_id, category_id) VALUES (?, ?)")
                .bind(post_id)
                .bind(category_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    let mut removed = Vec::new();
    for filename in &data.remove_image_filenames {
        let result = sqlx::query("DELETE FROM post_images WHERE post_id = ? AND filename = ?")
            .bind(post_id)
            .bind(filename)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() > 0 {
            removed.push(filename.clone());
        }
    }

    for filename in &data.add_image_filenames {
        sqlx::query("INSERT INTO post_images (post_id, filename, created_at) VALUES (?, ?, ?)")
            .bind(post_id)
            .bind(filename)
            .bind(now)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(removed)
}

/// Deletes a post and everything hanging off it. Returns the rows affected
/// for the post itself plus the image filenames to unlink from disk.
pub async fn delete_post(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<(u64, Vec<String>), sqlx::Error> {
    let filenames: Vec<String> =
        sqlx::query_scalar("SELECT filename FROM post_images WHERE post_id = ?")
            .bind(post_id)
            .fetch_all(pool)
            .await?;

    let mut tx = pool.begin().await?;
    for table in [
        "post_images",
        "post_categories",
        "post_likes",
        "post_reposts",
        "post_stars",
        "comments",
    ] {
        let sql = format!("DELETE FROM {} WHERE post_id = ?", table);
        sqlx::query(&sql).bind(post_id).execute(&mut *tx).await?;
    }
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(post_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok((result.rows_affected(), filenames))
}
