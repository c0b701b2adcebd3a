// ============================================================
// INGESTION TYPES
// ============================================================
// Data structures flowing through the tabular ingestion pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage type inferred for one ingested column.
///
/// The set is a closed allow-list: these names are the only type tokens ever
/// interpolated into table-creation statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Text,
    Integer,
    Numeric,
    Timestamp,
    Boolean,
}

impl ColumnType {
    /// SQL type name used in the provisioned table's column definitions.
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Numeric => "NUMERIC",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Boolean => "BOOLEAN",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// Inferred name/type metadata for one ingested column.
///
/// `sanitized` is unique within one ingestion, non-empty, at most 63
/// characters of `[a-z0-9_]`, and never starts or ends with an underscore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub original: String,
    pub sanitized: String,
    pub column_type: ColumnType,
}

/// Parsed tabular file content: ordered headers plus ordered rows.
///
/// Cells are positional; `rows[r][c]` belongs to `headers[c]`. Short rows are
/// padded with empty cells by the parsers, so every row has `headers.len()`
/// cells. An empty cell means a missing value.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// All values of one column, in row order.
    pub fn column_values(&self, index: usize) -> Vec<&str> {
        self.rows
            .iter()
            .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
            .collect()
    }
}
