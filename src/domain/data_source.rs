use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A persisted record describing a connected or uploaded data origin.
///
/// For file uploads, `storage_locator` holds the name of the dynamically
/// created table backing the source.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DataSource {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub source_kind: String,
    pub storage_locator: Option<String>,
    pub status: String,
    pub last_sync: Option<NaiveDateTime>,
    pub record_count: i64,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Fields required to register a new data source.
#[derive(Debug, Clone)]
pub struct NewDataSource {
    pub user_id: i64,
    pub name: String,
    pub source_kind: String,
    pub storage_locator: Option<String>,
    pub status: String,
    pub record_count: i64,
    pub description: Option<String>,
}

impl DataSource {
    /// The provisioned upload table backing this source, if any.
    ///
    /// Table names embed the owning user's id, and only a locator carrying
    /// this record's own id qualifies. A record whose locator names another
    /// user's table yields `None`, so reads and drops can never reach a
    /// table the record owner does not own.
    pub fn upload_table(&self) -> Option<&str> {
        let prefix = format!("upload_{}_", self.user_id);
        self.storage_locator
            .as_deref()
            .filter(|t| t.starts_with(&prefix))
    }
}
