use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

use crate::domain::error::{AppError, Result};

const APP_SCHEMA: &str = include_str!("../../resources/schema.sql");

// PRAGMA user_version tracks the applied schema generation.
const APP_SCHEMA_VERSION: i32 = 1;

/// Open (creating if missing) the application database and apply the schema.
pub async fn init_app_db(db_path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to open database: {}", e)))?;

    // If the DB is newer than this build expects, fail fast rather than
    // mutate a schema we don't understand.
    let current_version = read_user_version(&pool).await?;
    if current_version > APP_SCHEMA_VERSION {
        return Err(AppError::DatabaseError(format!(
            "Database schema too new: user_version={} > supported={}",
            current_version, APP_SCHEMA_VERSION
        )));
    }

    apply_schema(&pool).await?;
    set_user_version(&pool, APP_SCHEMA_VERSION).await?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Database health check failed: {}", e)))?;

    Ok(pool)
}

/// Apply all schema statements. Statements use CREATE IF NOT EXISTS, so this
/// is additive and safe to run on every start.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    for stmt in split_sql_statements(APP_SCHEMA) {
        sqlx::query(stmt)
            .execute(pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to apply schema: {}", e)))?;
    }
    Ok(())
}

fn split_sql_statements(sql: &str) -> impl Iterator<Item = &str> {
    sql.split(';').map(str::trim).filter(|s| {
        !s.is_empty() && !s.lines().all(|line| line.trim().starts_with("--"))
    })
}

async fn read_user_version(pool: &SqlitePool) -> Result<i32> {
    let version: i32 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to read user_version: {}", e)))?;
    Ok(version)
}

async fn set_user_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query(&format!("PRAGMA user_version = {}", version))
        .execute(pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to set user_version: {}", e)))?;
    Ok(())
}

#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    use std::str::FromStr;

    // In-memory SQLite is per-connection; cap the pool at one connection so
    // every query sees the same database.
    let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    apply_schema(&pool).await.unwrap();
    pool
}
