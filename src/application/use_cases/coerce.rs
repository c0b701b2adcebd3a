// ============================================================
// VALUE COERCION
// ============================================================
// Convert raw string cells into typed values before insertion

use crate::domain::ingest::ColumnType;

/// A typed cell value ready to bind into a parameterized insert.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Bool(bool),
    Text(String),
}

/// Coerce a raw cell according to the column's inferred type.
///
/// Missing (empty) cells become null for every type. Unparseable numbers
/// become null; boolean cells store true only for the truthy tokens and
/// false for anything else. Text and timestamp values pass through
/// unchanged; timestamp validation is left to the storage engine.
pub fn coerce_value(raw: &str, column_type: ColumnType) -> CellValue {
    if raw.is_empty() {
        return CellValue::Null;
    }

    match column_type {
        ColumnType::Integer => match raw.trim().parse::<i64>() {
            Ok(v) => CellValue::Integer(v),
            Err(_) => CellValue::Null,
        },
        ColumnType::Numeric => match raw.trim().parse::<f64>() {
            Ok(v) => CellValue::Real(v),
            Err(_) => CellValue::Null,
        },
        ColumnType::Boolean => {
            let truthy = matches!(raw.to_lowercase().as_str(), "true" | "1" | "yes");
            CellValue::Bool(truthy)
        }
        ColumnType::Text | ColumnType::Timestamp => CellValue::Text(raw.to_string()),
    }
}
