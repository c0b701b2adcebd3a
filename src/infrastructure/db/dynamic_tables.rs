// ============================================================
// DYNAMIC TABLE REPOSITORY
// ============================================================
// Provision, load and read the per-upload storage tables

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::application::use_cases::coerce::{coerce_value, CellValue};
use crate::domain::error::{AppError, Result};
use crate::domain::ingest::ColumnDescriptor;

/// Rows per insert batch, bounding statement count per loop iteration.
const BATCH_SIZE: usize = 100;

/// Shape every provisioned table name must match. Locators are stored in
/// user-reachable records, so anything else is refused before interpolation.
static TABLE_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^upload_\d+_\d+$").unwrap());

/// One entry of the column introspection listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
}

/// Repository over the dynamically provisioned `upload_*` tables.
///
/// Table and column names are the only identifiers ever interpolated into
/// SQL here; both come from the sanitizer and the naming rule, never from
/// raw user input. Cell values always go through bind parameters.
#[derive(Clone)]
pub struct DynamicTableRepository {
    pool: SqlitePool,
}

impl DynamicTableRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the storage table for one ingestion: an autoincrement identity
    /// column plus one column per descriptor.
    pub async fn create_table(&self, table: &str, columns: &[ColumnDescriptor]) -> Result<()> {
        validate_table_name(table)?;

        let column_defs = columns
            .iter()
            .map(|c| format!("\"{}\" {}", c.sanitized, c.column_type.sql_name()))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "CREATE TABLE \"{}\" (id INTEGER PRIMARY KEY AUTOINCREMENT, {})",
            table, column_defs
        );

        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create table: {}", e)))?;

        Ok(())
    }

    /// Load every row into the table, coercing cells per column type.
    ///
    /// The whole load runs in one transaction: a failing insert rolls back
    /// everything, never leaving a partially populated table behind.
    pub async fn insert_rows(
        &self,
        table: &str,
        columns: &[ColumnDescriptor],
        rows: &[Vec<String>],
    ) -> Result<u64> {
        validate_table_name(table)?;

        let column_names = columns
            .iter()
            .map(|c| format!("\"{}\"", c.sanitized))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            table, column_names, placeholders
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {}", e)))?;

        let mut inserted: u64 = 0;
        for batch in rows.chunks(BATCH_SIZE) {
            for row in batch {
                let mut query = sqlx::query(&sql);
                for (idx, column) in columns.iter().enumerate() {
                    let raw = row.get(idx).map(String::as_str).unwrap_or("");
                    query = match coerce_value(raw, column.column_type) {
                        CellValue::Null => query.bind(None::<String>),
                        CellValue::Integer(v) => query.bind(v),
                        CellValue::Real(v) => query.bind(v),
                        CellValue::Bool(v) => query.bind(v),
                        CellValue::Text(v) => query.bind(v),
                    };
                }

                let result = query.execute(&mut *tx).await.map_err(|e| {
                    AppError::DatabaseError(format!("Failed to insert row: {}", e))
                })?;
                inserted += result.rows_affected();
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit load: {}", e)))?;

        Ok(inserted)
    }

    pub async fn count_rows(&self, table: &str) -> Result<i64> {
        validate_table_name(table)?;

        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM \"{}\"", table))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count rows: {}", e)))
    }

    /// One window of rows ordered by the identity column, as JSON objects
    /// keyed by sanitized column name.
    pub async fn fetch_page(
        &self,
        table: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<serde_json::Value>> {
        validate_table_name(table)?;

        let rows = sqlx::query(&format!(
            "SELECT * FROM \"{}\" ORDER BY id LIMIT ? OFFSET ?",
            table
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch page: {}", e)))?;

        rows.iter().map(row_to_json).collect()
    }

    /// Column metadata for the table, excluding the identity column, in
    /// physical column order.
    pub async fn column_info(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        validate_table_name(table)?;

        sqlx::query_as::<_, ColumnInfo>(
            "SELECT name AS column_name, type AS data_type
             FROM pragma_table_info(?)
             WHERE name != 'id'
             ORDER BY cid",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to read column info: {}", e)))
    }

    /// Drop the backing table of a deleted data source. Missing tables are
    /// tolerated so source deletion stays idempotent.
    pub async fn drop_table(&self, table: &str) -> Result<()> {
        validate_table_name(table)?;

        sqlx::query(&format!("DROP TABLE IF EXISTS \"{}\"", table))
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to drop table: {}", e)))?;
        Ok(())
    }
}

fn validate_table_name(table: &str) -> Result<()> {
    if TABLE_NAME_PATTERN.is_match(table) {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!(
            "Invalid dynamic table name: {}",
            table
        )))
    }
}

/// Decode one row into a JSON object using SQLite's storage class per value.
fn row_to_json(row: &SqliteRow) -> Result<serde_json::Value> {
    let mut object = serde_json::Map::with_capacity(row.columns().len());

    for (idx, column) in row.columns().iter().enumerate() {
        let raw = row
            .try_get_raw(idx)
            .map_err(|e| AppError::DatabaseError(format!("Failed to read column: {}", e)))?;

        let value = if raw.is_null() {
            serde_json::Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => row
                    .try_get::<i64, _>(idx)
                    .map(serde_json::Value::from)
                    .unwrap_or(serde_json::Value::Null),
                "REAL" | "NUMERIC" => row
                    .try_get::<f64, _>(idx)
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
                _ => row
                    .try_get::<String, _>(idx)
                    .map(serde_json::Value::from)
                    .unwrap_or(serde_json::Value::Null),
            }
        };

        object.insert(column.name().to_string(), value);
    }

    Ok(serde_json::Value::Object(object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingest::ColumnType;
    use crate::infrastructure::db::connection::test_pool;

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor {
                original: "Revenue".to_string(),
                sanitized: "revenue".to_string(),
                column_type: ColumnType::Numeric,
            },
            ColumnDescriptor {
                original: "Signup Date".to_string(),
                sanitized: "signup_date".to_string(),
                column_type: ColumnType::Timestamp,
            },
            ColumnDescriptor {
                original: "Active".to_string(),
                sanitized: "active".to_string(),
                column_type: ColumnType::Boolean,
            },
        ]
    }

    fn rows() -> Vec<Vec<String>> {
        vec![
            vec!["1200.50".into(), "2024-01-15".into(), "yes".into()],
            vec!["980".into(), "2024-02-20".into(), "no".into()],
        ]
    }

    #[tokio::test]
    async fn test_provision_load_and_count() {
        let repo = DynamicTableRepository::new(test_pool().await);
        repo.create_table("upload_1_100", &columns()).await.unwrap();

        let inserted = repo
            .insert_rows("upload_1_100", &columns(), &rows())
            .await
            .unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(repo.count_rows("upload_1_100").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_fetch_page_returns_typed_json() {
        let repo = DynamicTableRepository::new(test_pool().await);
        repo.create_table("upload_1_101", &columns()).await.unwrap();
        repo.insert_rows("upload_1_101", &columns(), &rows())
            .await
            .unwrap();

        let page = repo.fetch_page("upload_1_101", 10, 0).await.unwrap();
        assert_eq!(page.len(), 2);

        let first = page[0].as_object().unwrap();
        assert_eq!(first["id"], serde_json::json!(1));
        assert_eq!(first["revenue"], serde_json::json!(1200.50));
        assert_eq!(first["signup_date"], serde_json::json!("2024-01-15"));
        assert_eq!(first["active"], serde_json::json!(1));
    }

    #[tokio::test]
    async fn test_column_info_excludes_identity_column() {
        let repo = DynamicTableRepository::new(test_pool().await);
        repo.create_table("upload_1_102", &columns()).await.unwrap();

        let info = repo.column_info("upload_1_102").await.unwrap();
        let names: Vec<&str> = info.iter().map(|c| c.column_name.as_str()).collect();
        assert_eq!(names, vec!["revenue", "signup_date", "active"]);
        assert_eq!(info[0].data_type, "NUMERIC");
        assert_eq!(info[2].data_type, "BOOLEAN");
    }

    #[tokio::test]
    async fn test_missing_values_become_null() {
        let repo = DynamicTableRepository::new(test_pool().await);
        repo.create_table("upload_1_103", &columns()).await.unwrap();
        repo.insert_rows(
            "upload_1_103",
            &columns(),
            &[vec!["".into(), "".into(), "".into()]],
        )
        .await
        .unwrap();

        let page = repo.fetch_page("upload_1_103", 10, 0).await.unwrap();
        let row = page[0].as_object().unwrap();
        assert_eq!(row["revenue"], serde_json::Value::Null);
        assert_eq!(row["active"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_rejects_arbitrary_table_names() {
        let repo = DynamicTableRepository::new(test_pool().await);
        let err = repo.count_rows("data_sources").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_drop_table_is_idempotent() {
        let repo = DynamicTableRepository::new(test_pool().await);
        repo.create_table("upload_1_104", &columns()).await.unwrap();
        repo.drop_table("upload_1_104").await.unwrap();
        repo.drop_table("upload_1_104").await.unwrap();
    }
}
