use sqlx::sqlite::SqlitePool;

use crate::domain::data_source::{DataSource, NewDataSource};
use crate::domain::error::{AppError, Result};

/// Repository for the persisted `data_sources` records.
#[derive(Clone)]
pub struct DataSourceRepository {
    pool: SqlitePool,
}

impl DataSourceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, source: NewDataSource) -> Result<DataSource> {
        sqlx::query_as::<_, DataSource>(
            "INSERT INTO data_sources
                (user_id, name, source_kind, storage_locator, status, record_count, description)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(source.user_id)
        .bind(source.name)
        .bind(source.source_kind)
        .bind(source.storage_locator)
        .bind(source.status)
        .bind(source.record_count)
        .bind(source.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert data source: {}", e)))
    }

    /// All data sources owned by one user, newest first.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<DataSource>> {
        sqlx::query_as::<_, DataSource>(
            "SELECT * FROM data_sources WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list data sources: {}", e)))
    }

    /// Fetch one data source, enforcing ownership. An existing record owned
    /// by another user is indistinguishable from a missing one.
    pub async fn get_owned(&self, id: i64, user_id: i64) -> Result<DataSource> {
        sqlx::query_as::<_, DataSource>(
            "SELECT * FROM data_sources WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch data source: {}", e)))?
        .ok_or_else(|| AppError::NotFound("Data source not found".to_string()))
    }

    pub async fn delete(&self, id: i64, user_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM data_sources WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete data source: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::connection::test_pool;

    fn new_source(user_id: i64, name: &str) -> NewDataSource {
        NewDataSource {
            user_id,
            name: name.to_string(),
            source_kind: "CSV/Excel".to_string(),
            storage_locator: Some(format!("upload_{}_1", user_id)),
            status: "active".to_string(),
            record_count: 10,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_owned() {
        let repo = DataSourceRepository::new(test_pool().await);
        let created = repo.insert(new_source(1, "sales.csv")).await.unwrap();
        assert_eq!(created.user_id, 1);
        assert_eq!(created.record_count, 10);

        let fetched = repo.get_owned(created.id, 1).await.unwrap();
        assert_eq!(fetched.name, "sales.csv");
    }

    #[tokio::test]
    async fn test_ownership_is_enforced() {
        let repo = DataSourceRepository::new(test_pool().await);
        let created = repo.insert(new_source(1, "sales.csv")).await.unwrap();

        let err = repo.get_owned(created.id, 2).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_user() {
        let repo = DataSourceRepository::new(test_pool().await);
        repo.insert(new_source(1, "a.csv")).await.unwrap();
        repo.insert(new_source(2, "b.csv")).await.unwrap();

        let listed = repo.list_for_user(1).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "a.csv");
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = DataSourceRepository::new(test_pool().await);
        let created = repo.insert(new_source(1, "a.csv")).await.unwrap();
        repo.delete(created.id, 1).await.unwrap();
        assert!(repo.get_owned(created.id, 1).await.is_err());
    }
}
