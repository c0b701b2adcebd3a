use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};

use crate::domain::error::{AppError, Result};
use crate::domain::ingest::RawTable;

/// Parse the first sheet of a spreadsheet into headers plus data rows.
///
/// `open_workbook_auto` handles both `.xlsx` and legacy `.xls`. The first
/// spreadsheet row supplies the headers; every cell is stringified so the
/// downstream type inference sees the same shape as CSV input.
pub fn parse_workbook(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AppError::ParseError(format!("Failed to open spreadsheet: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::ParseError("No worksheet found in spreadsheet".to_string()))?
        .map_err(|e| AppError::ParseError(format!("Failed to read spreadsheet range: {}", e)))?;

    let mut row_iter = range.rows();

    let headers: Vec<String> = match row_iter.next() {
        Some(row) => row.iter().map(cell_to_string).collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for row in row_iter {
        let mut cells: Vec<String> = row.iter().map(cell_to_string).collect();
        if cells.iter().all(|s| s.is_empty()) {
            continue;
        }
        cells.resize(headers.len(), String::new());
        rows.push(cells);
    }

    Ok(RawTable { headers, rows })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        _ => cell
            .as_string()
            .unwrap_or_else(|| format!("{}", cell))
            .trim()
            .to_string(),
    }
}
