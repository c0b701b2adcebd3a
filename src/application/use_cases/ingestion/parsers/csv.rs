use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::domain::error::{AppError, Result};
use crate::domain::ingest::RawTable;

/// Parse a CSV file into headers plus data rows.
pub fn parse_csv_file(path: &Path) -> Result<RawTable> {
    let content = read_with_encoding_detection(path)?;
    parse_csv_content(&content)
}

/// Parse CSV content: first record is the header row, every following record
/// becomes one data row keyed by position. Rows shorter than the header are
/// padded with empty cells; fully empty rows are dropped.
pub fn parse_csv_content(content: &str) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
        })?;

        let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        if row.iter().all(|s| s.is_empty()) {
            continue;
        }
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

/// Read file bytes as UTF-8, falling back to Windows-1252 for legacy exports.
fn read_with_encoding_detection(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::IoError(format!("Failed to read uploaded file: {}", e)))?;

    match String::from_utf8(bytes) {
        Ok(content) => Ok(content),
        Err(err) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(err.as_bytes());
            Ok(decoded.into_owned())
        }
    }
}
