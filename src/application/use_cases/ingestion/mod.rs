// ============================================================
// INGESTION USE CASE
// ============================================================
// Orchestrate parse -> infer -> provision -> load -> register

pub mod parsers;

use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::application::use_cases::infer::infer_column_type;
use crate::application::use_cases::sanitize::sanitize_headers;
use crate::domain::data_source::{DataSource, NewDataSource};
use crate::domain::error::{AppError, Result};
use crate::domain::ingest::{ColumnDescriptor, RawTable};
use crate::infrastructure::db::data_sources::DataSourceRepository;
use crate::infrastructure::db::dynamic_tables::DynamicTableRepository;

/// Source kind recorded for every file upload.
const UPLOAD_SOURCE_KIND: &str = "CSV/Excel";

/// Result of one successful ingestion.
#[derive(Debug, Serialize)]
pub struct IngestionOutcome {
    pub source: DataSource,
    pub columns: Vec<ColumnDescriptor>,
    pub row_count: usize,
}

/// Runs the full upload pipeline for one file.
///
/// Each ingestion is independent: the provisioned table name embeds the owner
/// id and a millisecond timestamp, so concurrent uploads never contend on
/// shared state beyond the connection pool.
pub struct IngestionUseCase {
    sources: DataSourceRepository,
    tables: DynamicTableRepository,
}

impl IngestionUseCase {
    pub fn new(sources: DataSourceRepository, tables: DynamicTableRepository) -> Self {
        Self { sources, tables }
    }

    /// Ingest one uploaded file and register the resulting data source.
    ///
    /// The caller owns the temporary file and is responsible for deleting it
    /// on every exit path.
    pub async fn execute(
        &self,
        owner_id: i64,
        original_filename: &str,
        path: &Path,
    ) -> Result<IngestionOutcome> {
        let extension = Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                AppError::ValidationError("Uploaded file has no extension".to_string())
            })?;

        let table = parsers::parse_table(path, extension)?;
        if table.rows.is_empty() {
            return Err(AppError::ValidationError("File is empty".to_string()));
        }

        let columns = describe_columns(&table);
        let table_name = format!("upload_{}_{}", owner_id, Utc::now().timestamp_millis());

        self.tables.create_table(&table_name, &columns).await?;
        self.tables
            .insert_rows(&table_name, &columns, &table.rows)
            .await?;

        let source = self
            .sources
            .insert(NewDataSource {
                user_id: owner_id,
                name: original_filename.to_string(),
                source_kind: UPLOAD_SOURCE_KIND.to_string(),
                storage_locator: Some(table_name.clone()),
                status: "active".to_string(),
                record_count: table.rows.len() as i64,
                description: Some(format!(
                    "Uploaded file: {} ({} columns, {} rows)",
                    original_filename,
                    columns.len(),
                    table.rows.len()
                )),
            })
            .await?;

        info!(
            source_id = source.id,
            table = %table_name,
            rows = table.rows.len(),
            columns = columns.len(),
            "Ingested uploaded file"
        );

        Ok(IngestionOutcome {
            source,
            columns,
            row_count: table.rows.len(),
        })
    }
}

/// Build the column descriptors for a parsed table: sanitized unique names
/// plus one inferred type per column.
fn describe_columns(table: &RawTable) -> Vec<ColumnDescriptor> {
    let sanitized = sanitize_headers(&table.headers);

    table
        .headers
        .iter()
        .zip(sanitized)
        .enumerate()
        .map(|(idx, (original, sanitized))| ColumnDescriptor {
            original: original.clone(),
            sanitized,
            column_type: infer_column_type(&table.column_values(idx)),
        })
        .collect()
}
