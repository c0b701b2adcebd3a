use actix_web::{delete, get, post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use validator::Validate;

use crate::domain::data_source::NewDataSource;
use crate::domain::error::{AppError, Result};
use crate::interfaces::http::auth::AuthedUser;
use crate::interfaces::http::{error_response, HttpState};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDataSourceRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub source_kind: String,
    pub storage_locator: Option<String>,
    pub description: Option<String>,
}

/// GET /api/data-sources — the caller's sources, newest first.
#[get("/data-sources")]
pub async fn list_data_sources(data: web::Data<HttpState>, user: AuthedUser) -> impl Responder {
    match data.sources.list_for_user(user.id).await {
        Ok(sources) => HttpResponse::Ok().json(sources),
        Err(err) => {
            error!(user_id = user.id, error = %err, "Failed to list data sources");
            error_response(err)
        }
    }
}

/// GET /api/data-sources/{id}
#[get("/data-sources/{id}")]
pub async fn get_data_source(
    data: web::Data<HttpState>,
    user: AuthedUser,
    path: web::Path<i64>,
) -> impl Responder {
    match data.sources.get_owned(*path, user.id).await {
        Ok(source) => HttpResponse::Ok().json(source),
        Err(err) => error_response(err),
    }
}

/// POST /api/data-sources — register an externally connected source.
#[post("/data-sources")]
pub async fn create_data_source(
    data: web::Data<HttpState>,
    user: AuthedUser,
    body: web::Json<CreateDataSourceRequest>,
) -> impl Responder {
    if let Err(err) = body.validate() {
        return error_response(AppError::ValidationError(err.to_string()));
    }
    if let Err(err) = validate_locator(body.storage_locator.as_deref()) {
        return error_response(err);
    }

    let request = body.into_inner();
    let result = data
        .sources
        .insert(NewDataSource {
            user_id: user.id,
            name: request.name,
            source_kind: request.source_kind,
            storage_locator: request.storage_locator,
            status: "active".to_string(),
            record_count: 0,
            description: request.description,
        })
        .await;

    match result {
        Ok(source) => HttpResponse::Created().json(source),
        Err(err) => {
            error!(user_id = user.id, error = %err, "Failed to create data source");
            error_response(err)
        }
    }
}

/// DELETE /api/data-sources/{id} — remove the record and, for uploads, drop
/// the backing table so no orphaned storage is left behind.
#[delete("/data-sources/{id}")]
pub async fn delete_data_source(
    data: web::Data<HttpState>,
    user: AuthedUser,
    path: web::Path<i64>,
) -> impl Responder {
    match remove_source(&data, user.id, *path).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "success": true })),
        Err(err) => {
            error!(user_id = user.id, source_id = *path, error = %err, "Failed to delete data source");
            error_response(err)
        }
    }
}

/// Locators in the upload namespace are assigned by the ingestion pipeline.
/// Accepting one here would let a caller alias an arbitrary upload table
/// under a record they own.
fn validate_locator(locator: Option<&str>) -> Result<()> {
    match locator {
        Some(l) if l.starts_with("upload_") => Err(AppError::ValidationError(
            "storage_locator values in the upload namespace are assigned by the upload pipeline"
                .to_string(),
        )),
        _ => Ok(()),
    }
}

async fn remove_source(data: &HttpState, user_id: i64, source_id: i64) -> Result<()> {
    let source = data.sources.get_owned(source_id, user_id).await?;

    // upload_table() only yields tables carrying the record owner's id, so a
    // record pointing at another user's table deletes the record alone.
    if let Some(table) = source.upload_table() {
        data.tables.drop_table(table).await?;
        info!(source_id, table, "Dropped backing table for deleted source");
    }

    data.sources.delete(source_id, user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingest::{ColumnDescriptor, ColumnType};
    use crate::infrastructure::config::Settings;
    use crate::infrastructure::db::connection::test_pool;

    async fn state() -> HttpState {
        HttpState::new(test_pool().await, Settings::default())
    }

    fn value_column() -> Vec<ColumnDescriptor> {
        vec![ColumnDescriptor {
            original: "Value".to_string(),
            sanitized: "value".to_string(),
            column_type: ColumnType::Integer,
        }]
    }

    fn source_with_locator(user_id: i64, locator: &str) -> NewDataSource {
        NewDataSource {
            user_id,
            name: "sales.csv".to_string(),
            source_kind: "CSV/Excel".to_string(),
            storage_locator: Some(locator.to_string()),
            status: "active".to_string(),
            record_count: 0,
            description: None,
        }
    }

    #[test]
    fn test_locator_validation_rejects_upload_namespace() {
        assert!(validate_locator(Some("upload_2_5")).is_err());
        assert!(validate_locator(Some("warehouse.orders")).is_ok());
        assert!(validate_locator(None).is_ok());
    }

    #[tokio::test]
    async fn test_delete_drops_own_upload_table() {
        let state = state().await;
        state.tables.create_table("upload_1_5", &value_column()).await.unwrap();

        let source = state
            .sources
            .insert(source_with_locator(1, "upload_1_5"))
            .await
            .unwrap();
        remove_source(&state, 1, source.id).await.unwrap();

        assert!(state.tables.count_rows("upload_1_5").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_never_drops_another_users_table() {
        let state = state().await;
        state.tables.create_table("upload_2_5", &value_column()).await.unwrap();
        state
            .tables
            .insert_rows("upload_2_5", &value_column(), &[vec!["41".to_string()]])
            .await
            .unwrap();

        // A record owned by user 1 whose locator names user 2's table.
        let forged = state
            .sources
            .insert(source_with_locator(1, "upload_2_5"))
            .await
            .unwrap();
        remove_source(&state, 1, forged.id).await.unwrap();

        // The record is gone but the other user's table is intact.
        assert!(state.sources.get_owned(forged.id, 1).await.is_err());
        assert_eq!(state.tables.count_rows("upload_2_5").await.unwrap(), 1);
    }
}
