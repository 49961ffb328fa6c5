use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

/// Seed the database with an initial admin account and starter categories.
///
/// This function is idempotent – it uses `ON CONFLICT DO NOTHING`
/// so it can safely be run multiple times.
pub async fn seed_database(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("seeding admin account");

    sqlx::query(
        "INSERT INTO users (login, full_name, email, role, stars_balance, created_at) \
         VALUES (?, ?, ?, 'ADMIN', 0, ?) ON CONFLICT (login) DO NOTHING",
    )
    .bind("admin")
    .bind("Administrator")
    .bind("admin@localhost")
    .bind(Utc::now())
    .execute(pool)
    .await?;
    let admin_id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE login = ?")
        .bind("admin")
        .fetch_one(pool)
        .await?;
    info!(admin_id, "ensured admin account");

    info!("seeding categories");
    for (title, description) in [
        ("General", "Anything that fits nowhere else."),
        ("Questions", "Ask the community for help."),
    ] {
        sqlx::query(
            "INSERT INTO categories (title, description) VALUES (?, ?) \
             ON CONFLICT (title) DO NOTHING",
        )
        .bind(title)
        .bind(description)
        .execute(pool)
        .await?;
        let category_id: i64 = sqlx::query_scalar("SELECT id FROM categories WHERE title = ?")
            .bind(title)
            .fetch_one(pool)
            .await?;
        info!(category_id, title, "ensured category");
    }

    info!("database seeding completed");
    Ok(())
}
