use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse, Responder};
use futures_util::StreamExt;
use serde::Serialize;
use tracing::{error, info};

use crate::application::use_cases::ingestion::parsers::SUPPORTED_EXTENSIONS;
use crate::application::use_cases::ingestion::IngestionOutcome;
use crate::domain::data_source::DataSource;
use crate::domain::error::{AppError, Result};
use crate::domain::ingest::ColumnType;
use crate::infrastructure::storage::{ensure_uploads_dir, TempUpload};
use crate::interfaces::http::auth::AuthedUser;
use crate::interfaces::http::{error_response, HttpState};

#[derive(Serialize)]
struct UploadColumn {
    name: String,
    original: String,
    #[serde(rename = "type")]
    column_type: ColumnType,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    source: DataSource,
    columns: Vec<UploadColumn>,
    row_count: usize,
}

impl From<IngestionOutcome> for UploadResponse {
    fn from(outcome: IngestionOutcome) -> Self {
        let columns = outcome
            .columns
            .into_iter()
            .map(|c| UploadColumn {
                name: c.sanitized,
                original: c.original,
                column_type: c.column_type,
            })
            .collect();

        Self {
            source: outcome.source,
            columns,
            row_count: outcome.row_count,
        }
    }
}

/// POST /api/upload — ingest one uploaded CSV/Excel file.
#[post("/upload")]
pub async fn upload_file(
    data: web::Data<HttpState>,
    user: AuthedUser,
    payload: Multipart,
) -> impl Responder {
    match receive_and_ingest(&data, user.id, payload).await {
        Ok(outcome) => {
            info!(user_id = user.id, source_id = outcome.source.id, "Upload complete");
            HttpResponse::Ok().json(UploadResponse::from(outcome))
        }
        Err(err) => {
            error!(user_id = user.id, error = %err, "Upload failed");
            error_response(err)
        }
    }
}

/// Stream the multipart `file` field to a temp path, then run ingestion.
/// The temp file is removed on every exit path by the `TempUpload` guard.
async fn receive_and_ingest(
    data: &HttpState,
    user_id: i64,
    mut payload: Multipart,
) -> Result<IngestionOutcome> {
    let uploads_dir = ensure_uploads_dir(&data.settings.uploads_dir)
        .map_err(|e| AppError::IoError(format!("Failed to prepare uploads dir: {}", e)))?;

    while let Some(item) = payload.next().await {
        let mut field = item
            .map_err(|e| AppError::ValidationError(format!("Malformed upload request: {}", e)))?;

        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(str::to_string));
        if field_name.as_deref() != Some("file") {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(str::to_string))
            .ok_or_else(|| AppError::ValidationError("No file uploaded".to_string()))?;

        let extension = Path::new(&filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AppError::ValidationError(
                "Unsupported file format".to_string(),
            ));
        }

        let temp = TempUpload::reserve(&uploads_dir, &filename);
        write_field_to_file(&mut field, temp.path(), data.settings.max_upload_bytes).await?;

        return data.ingestion.execute(user_id, &filename, temp.path()).await;
    }

    Err(AppError::ValidationError("No file uploaded".to_string()))
}

async fn write_field_to_file(
    field: &mut actix_multipart::Field,
    path: &Path,
    max_bytes: usize,
) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| AppError::IoError(format!("Failed to create temp file: {}", e)))?;
    let mut writer = BufWriter::new(file);
    let mut written = 0usize;

    while let Some(chunk) = field.next().await {
        let chunk =
            chunk.map_err(|e| AppError::ValidationError(format!("Upload interrupted: {}", e)))?;

        written += chunk.len();
        if written > max_bytes {
            return Err(AppError::ValidationError(format!(
                "File exceeds the {} MiB upload limit",
                max_bytes / (1024 * 1024)
            )));
        }

        writer
            .write_all(&chunk)
            .map_err(|e| AppError::IoError(format!("Failed to write temp file: {}", e)))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::IoError(format!("Failed to flush temp file: {}", e)))?;
    Ok(())
}
