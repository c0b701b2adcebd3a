pub mod auth;
pub mod data;
pub mod sources;
pub mod upload;

use actix_cors::Cors;
use actix_web::{dev::Server, web, App, HttpResponse, HttpServer};
use sqlx::sqlite::SqlitePool;

use crate::application::IngestionUseCase;
use crate::domain::error::AppError;
use crate::infrastructure::config::Settings;
use crate::infrastructure::db::data_sources::DataSourceRepository;
use crate::infrastructure::db::dynamic_tables::DynamicTableRepository;

/// Shared state handed to every handler.
pub struct HttpState {
    pub settings: Settings,
    pub sources: DataSourceRepository,
    pub tables: DynamicTableRepository,
    pub ingestion: IngestionUseCase,
}

impl HttpState {
    pub fn new(pool: SqlitePool, settings: Settings) -> Self {
        let sources = DataSourceRepository::new(pool.clone());
        let tables = DynamicTableRepository::new(pool);
        let ingestion = IngestionUseCase::new(sources.clone(), tables.clone());
        Self {
            settings,
            sources,
            tables,
            ingestion,
        }
    }
}

/// Map the error taxonomy onto HTTP statuses with a JSON error body.
pub fn error_response(err: AppError) -> HttpResponse {
    let body = serde_json::json!({ "error": err.to_string() });
    match err {
        AppError::ValidationError(_) | AppError::ParseError(_) => {
            HttpResponse::BadRequest().json(body)
        }
        AppError::NotFound(_) => HttpResponse::NotFound().json(body),
        AppError::Unauthorized(_) => HttpResponse::Unauthorized().json(body),
        AppError::Internal(_)
        | AppError::DatabaseError(_)
        | AppError::IoError(_) => HttpResponse::InternalServerError().json(body),
    }
}

pub fn start_server(pool: SqlitePool, settings: Settings) -> std::io::Result<Server> {
    let bind_addr = (settings.host.clone(), settings.port);
    let state = web::Data::new(HttpState::new(pool, settings));

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new().wrap(cors).app_data(state.clone()).service(
            web::scope("/api")
                .service(upload::upload_file)
                .service(data::get_source_data)
                .service(data::get_source_columns)
                .service(sources::list_data_sources)
                .service(sources::get_data_source)
                .service(sources::create_data_source)
                .service(sources::delete_data_source),
        )
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}
