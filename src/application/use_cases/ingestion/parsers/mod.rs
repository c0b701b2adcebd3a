mod csv;
mod xlsx;

use std::path::Path;

use crate::domain::error::{AppError, Result};
use crate::domain::ingest::RawTable;

pub use self::csv::parse_csv_content;

/// File extensions the upload pipeline accepts.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

/// Parse an uploaded file into headers plus data rows.
///
/// Dispatches on the declared extension; unsupported extensions are rejected
/// before any bytes are read.
pub fn parse_table(path: &Path, extension: &str) -> Result<RawTable> {
    match extension.to_lowercase().as_str() {
        "csv" => csv::parse_csv_file(path),
        "xlsx" | "xls" => xlsx::parse_workbook(path),
        other => Err(AppError::ValidationError(format!(
            "Unsupported file format: .{}",
            other
        ))),
    }
}
