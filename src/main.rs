use tracing::info;
use tracing_subscriber::EnvFilter;

use datalens::infrastructure::config::Settings;
use datalens::infrastructure::db::connection::init_app_db;
use datalens::infrastructure::storage::ensure_uploads_dir;
use datalens::interfaces::http::start_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    ensure_uploads_dir(&settings.uploads_dir)?;

    let pool = init_app_db(&settings.database_path)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    info!(
        host = %settings.host,
        port = settings.port,
        database = %settings.database_path.display(),
        "Starting DataLens ingestion service"
    );

    start_server(pool, settings)?.await
}
