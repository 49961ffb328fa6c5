use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::StarEntry;

/// Result of a star transfer attempt. A balance shortfall is not an error;
/// the handler translates it into a BadRequest.
pub enum TransferOutcome {
    Applied(StarEntry),
    InsufficientBalance,
}

pub async fn has_starred(
    pool: &SqlitePool,
    post_id: i64,
    user_id: i64,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 FROM post_stars WHERE post_id = ? AND user_id = ?")
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Moves `stars` from the giver to the post author: the debit, the ledger
/// insert, and the credit commit or roll back together. The debit doubles
/// as the balance check so a concurrent spend cannot overdraw.
pub async fn transfer_stars(
    pool: &SqlitePool,
    post_id: i64,
    giver_id: i64,
    author_id: i64,
    stars: i64,
) -> Result<TransferOutcome, sqlx::Error> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let debit = sqlx::query(
        "UPDATE users SET stars_balance = stars_balance - ? WHERE id = ? AND stars_balance >= ?",
    )
    .bind(stars)
    .bind(giver_id)
    .bind(stars)
    .execute(&mut *tx)
    .await?;
    if debit.rows_affected() == 0 {
        // Rollback is implicit on drop.
        return Ok(TransferOutcome::InsufficientBalance);
    }

    let inserted = sqlx::query(
        "INSERT INTO post_stars (post_id, user_id, stars, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(post_id)
    .bind(giver_id)
    .bind(stars)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE users SET stars_balance = stars_balance + ? WHERE id = ?")
        .bind(stars)
        .bind(author_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(TransferOutcome::Applied(StarEntry {
        id: inserted.last_insert_rowid(),
        post_id,
        user_id: giver_id,
        stars,
        created_at: now,
    }))
}
