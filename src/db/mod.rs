pub mod models;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;

pub type DbPool = Pool<Sqlite>;

pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    // Create the database file if it doesn't exist
    if database_url.starts_with("sqlite:") {
        let db_path = database_url.trim_start_matches("sqlite:");
        if db_path != ":memory:" && !Path::new(db_path).exists() {
            if let Some(parent) = Path::new(db_path).parent() {
                std::fs::create_dir_all(parent).ok();
            }
            std::fs::File::create(db_path).ok();
        }
    }

    SqlitePoolOptions::new().connect(database_url).await
}

/// Pool over an in-memory database for tests. A single connection keeps
/// every query on the same in-memory instance.
pub async fn create_memory_pool() -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
}

pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    let migration_sql = include_str!("migrations/001_initial_schema.sql");

    for statement in migration_sql.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
