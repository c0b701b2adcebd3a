use actix_web::{get, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::domain::error::{AppError, Result};
use crate::interfaces::http::auth::AuthedUser;
use crate::interfaces::http::{error_response, HttpState};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

#[derive(Deserialize)]
pub struct PageQuery {
    page: Option<i64>,
    limit: Option<i64>,
}

/// GET /api/upload/{source_id}/data — one page of a provisioned table.
#[get("/upload/{source_id}/data")]
pub async fn get_source_data(
    data: web::Data<HttpState>,
    user: AuthedUser,
    path: web::Path<i64>,
    query: web::Query<PageQuery>,
) -> impl Responder {
    match fetch_data_page(&data, user.id, *path, &query).await {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(err) => {
            error!(user_id = user.id, source_id = *path, error = %err, "Data page failed");
            error_response(err)
        }
    }
}

/// GET /api/upload/{source_id}/columns — column metadata, identity excluded.
#[get("/upload/{source_id}/columns")]
pub async fn get_source_columns(
    data: web::Data<HttpState>,
    user: AuthedUser,
    path: web::Path<i64>,
) -> impl Responder {
    match fetch_columns(&data, user.id, *path).await {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(err) => {
            error!(user_id = user.id, source_id = *path, error = %err, "Column lookup failed");
            error_response(err)
        }
    }
}

async fn fetch_data_page(
    data: &HttpState,
    user_id: i64,
    source_id: i64,
    query: &PageQuery,
) -> Result<serde_json::Value> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1) * limit;

    let table = locate_table(data, user_id, source_id).await?;
    let total = data.tables.count_rows(&table).await?;
    let rows = data.tables.fetch_page(&table, limit, offset).await?;

    Ok(json!({
        "data": rows,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "totalPages": total_pages(total, limit),
        }
    }))
}

async fn fetch_columns(
    data: &HttpState,
    user_id: i64,
    source_id: i64,
) -> Result<serde_json::Value> {
    let table = locate_table(data, user_id, source_id).await?;
    let columns = data.tables.column_info(&table).await?;
    serde_json::to_value(columns)
        .map_err(|e| AppError::Internal(format!("Failed to serialize columns: {}", e)))
}

/// Resolve an ownership-checked source to its backing table name.
///
/// Both checks are required: `get_owned` proves the record belongs to the
/// caller, and `upload_table` proves the locator names a table provisioned
/// for that same user. A record aliasing someone else's table resolves to
/// nothing.
async fn locate_table(data: &HttpState, user_id: i64, source_id: i64) -> Result<String> {
    let source = data.sources.get_owned(source_id, user_id).await?;
    source.upload_table().map(str::to_string).ok_or_else(|| {
        AppError::ValidationError(
            "Data source is not backed by an upload table owned by the caller".to_string(),
        )
    })
}

fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}
