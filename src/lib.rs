pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

pub use application::IngestionUseCase;
pub use domain::error::{AppError, Result};
pub use infrastructure::config::Settings;
