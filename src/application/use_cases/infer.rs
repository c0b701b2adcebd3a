// ============================================================
// TYPE INFERENCE
// ============================================================
// Classify a column of raw string values into a storage type

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::ingest::ColumnType;

/// Values examined per column; the rest of the column is ignored.
const SAMPLE_SIZE: usize = 100;

/// ISO-like date prefixes: `YYYY-MM-DD` or `M/D/YY[YY]`.
static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}|^\d{1,2}/\d{1,2}/\d{2,4}").unwrap());

const BOOLEAN_TOKENS: [&str; 6] = ["true", "false", "0", "1", "yes", "no"];

/// Infer the storage type for one column from its raw values.
///
/// Rules run in fixed priority order and the first match wins:
/// numbers, then dates, then booleans, then text. The numeric check running
/// first means a column of only `0`/`1` values is always INTEGER, never
/// BOOLEAN; downstream consumers rely on that ordering.
pub fn infer_column_type(values: &[&str]) -> ColumnType {
    let sample: Vec<&str> = values
        .iter()
        .copied()
        .filter(|v| !v.is_empty())
        .take(SAMPLE_SIZE)
        .collect();

    if sample.is_empty() {
        return ColumnType::Text;
    }

    if sample.iter().all(|v| is_number(v)) {
        let has_decimals = sample.iter().any(|v| v.contains('.'));
        return if has_decimals {
            ColumnType::Numeric
        } else {
            ColumnType::Integer
        };
    }

    if sample.iter().all(|v| DATE_PATTERN.is_match(v)) {
        return ColumnType::Timestamp;
    }

    if sample
        .iter()
        .all(|v| BOOLEAN_TOKENS.contains(&v.to_lowercase().as_str()))
    {
        return ColumnType::Boolean;
    }

    ColumnType::Text
}

/// Plain decimal notation only. Exponent and nan/inf forms parse as `f64`
/// but have no faithful integer storage, so they stay text.
fn is_number(value: &str) -> bool {
    let v = value.trim();
    v.parse::<f64>().is_ok()
        && v.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_integers() {
        assert_eq!(infer_column_type(&["1", "2", "3"]), ColumnType::Integer);
    }

    #[test]
    fn test_decimal_point_switches_to_numeric() {
        assert_eq!(infer_column_type(&["1", "2.5"]), ColumnType::Numeric);
    }

    #[test]
    fn test_iso_dates() {
        assert_eq!(
            infer_column_type(&["2024-01-15", "2024-02-20"]),
            ColumnType::Timestamp
        );
    }

    #[test]
    fn test_us_dates() {
        assert_eq!(
            infer_column_type(&["1/15/24", "12/1/2024"]),
            ColumnType::Timestamp
        );
    }

    #[test]
    fn test_booleans() {
        assert_eq!(
            infer_column_type(&["true", "false", "yes"]),
            ColumnType::Boolean
        );
        assert_eq!(infer_column_type(&["YES", "No", "TRUE"]), ColumnType::Boolean);
    }

    #[test]
    fn test_numeric_check_precedes_boolean() {
        // "0"/"1" parse as numbers, so the boolean rule is never reached.
        assert_eq!(infer_column_type(&["0", "1"]), ColumnType::Integer);
    }

    #[test]
    fn test_exponent_and_nan_forms_are_text() {
        // These parse as f64 but would be discarded by integer coercion.
        assert_eq!(infer_column_type(&["1e5", "2e3"]), ColumnType::Text);
        assert_eq!(infer_column_type(&["nan", "inf"]), ColumnType::Text);
        assert_eq!(infer_column_type(&["-3", "+4"]), ColumnType::Integer);
    }

    #[test]
    fn test_mixed_content_is_text() {
        assert_eq!(
            infer_column_type(&["abc", "123", "2024-01-01"]),
            ColumnType::Text
        );
    }

    #[test]
    fn test_empty_values_are_skipped() {
        assert_eq!(infer_column_type(&["", "", "1", "2"]), ColumnType::Integer);
    }

    #[test]
    fn test_all_empty_is_text() {
        assert_eq!(infer_column_type(&["", "", ""]), ColumnType::Text);
        assert_eq!(infer_column_type(&[]), ColumnType::Text);
    }

    #[test]
    fn test_sample_is_capped() {
        // Values past the first 100 non-empty entries do not affect the result.
        let mut values: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        values.push("not a number".to_string());
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        assert_eq!(infer_column_type(&refs), ColumnType::Integer);
    }
}
