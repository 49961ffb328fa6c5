use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::Category;
use crate::utils::PageParams;

// Input data for creating a new category
#[derive(serde::Deserialize)]
pub struct CreateCategoryData {
    pub title: String,
    pub description: Option<String>,
}

// Input data for updating a category; absent fields keep their value
#[derive(serde::Deserialize)]
pub struct UpdateCategoryData {
    pub title: Option<String>,
    pub description: Option<String>,
}

pub async fn create_category(
    pool: &SqlitePool,
    data: CreateCategoryData,
) -> Result<Category, sqlx::Error> {
    let result = sqlx::query("INSERT INTO categories (title, description) VALUES (?, ?)")
        .bind(&data.title)
        .bind(&data.description)
        .execute(pool)
        .await?;
    let id = result.last_insert_rowid();
    match get_category_by_id(pool, id).await? {
        Some(category) => Ok(category),
        None => Err(sqlx::Error::RowNotFound),
    }
}

pub async fn get_category_by_id(
    pool: &SqlitePool,
    category_id: i64,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>("SELECT id, title, description FROM categories WHERE id = ?")
        .bind(category_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_all_categories(
    pool: &SqlitePool,
    params: &PageParams,
) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT id, title, description FROM categories ORDER BY title ASC LIMIT ? OFFSET ?",
    )
    .bind(params.limit() as i64)
    .bind(params.offset() as i64)
    .fetch_all(pool)
    .await
}

pub async fn count_categories(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await
}

pub async fn update_category(
    pool: &SqlitePool,
    category_id: i64,
    data: UpdateCategoryData,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query(
        "UPDATE categories SET title = COALESCE(?, title), \
         description = COALESCE(?, description) WHERE id = ?",
    )
    .bind(&data.title)
    .bind(&data.description)
    .bind(category_id)
    .execute(pool)
    .await?;

    get_category_by_id(pool, category_id).await
}

/// Returns the number of rows affected.
pub async fn delete_category(pool: &SqlitePool, category_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(category_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Returns the subset of `ids` with no matching category row. A post may
/// only reference categories that exist.
pub async fn find_missing_ids(
    pool: &SqlitePool,
    ids: &[i64],
) -> Result<Vec<i64>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT id FROM categories WHERE id IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");

    let found: Vec<i64> = qb.build_query_scalar().fetch_all(pool).await?;
    Ok(ids
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect())
}

pub async fn get_categories_for_post(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT c.id, c.title, c.description
        FROM categories c
        JOIN post_categories pc ON pc.category_id = c.id
        WHERE pc.post_id = ?
        ORDER BY c.id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
}
