// ============================================================
// IDENTIFIER SANITIZER
// ============================================================
// Convert arbitrary column headers into safe storage identifiers

use std::collections::HashSet;

/// Maximum identifier length accepted by the storage engine.
const MAX_IDENTIFIER_LEN: usize = 63;

/// Sanitize a single header into a storage-safe identifier.
///
/// Lowercases the input, replaces every character outside `[a-z0-9_]` with an
/// underscore, collapses underscore runs, strips leading/trailing underscores
/// and truncates to 63 characters. The result may be empty when the header
/// carried no usable characters; callers use [`sanitize_headers`] to apply the
/// positional fallback. Idempotent.
pub fn sanitize_identifier(header: &str) -> String {
    let mapped: String = header
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let collapsed = mapped
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    // Truncation can expose a trailing underscore; strip it again.
    let truncated: String = collapsed.chars().take(MAX_IDENTIFIER_LEN).collect();
    truncated.trim_end_matches('_').to_string()
}

/// Sanitize a full header row, guaranteeing non-empty unique identifiers.
///
/// Headers that sanitize to nothing fall back to `col_{index}`. Distinct
/// headers that collapse to the same identifier get a numeric suffix
/// (`name`, `name_2`, `name_3`, ...), keeping the first occurrence unchanged.
pub fn sanitize_headers(headers: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(headers.len());

    for (idx, header) in headers.iter().enumerate() {
        let mut name = sanitize_identifier(header);
        if name.is_empty() {
            name = format!("col_{}", idx);
        }

        if seen.contains(&name) {
            let mut suffix = 2usize;
            loop {
                let candidate = disambiguate(&name, suffix);
                if !seen.contains(&candidate) {
                    name = candidate;
                    break;
                }
                suffix += 1;
            }
        }

        seen.insert(name.clone());
        out.push(name);
    }

    out
}

/// Append a numeric suffix while keeping the result within the length cap.
fn disambiguate(name: &str, suffix: usize) -> String {
    let tail = format!("_{}", suffix);
    let keep = MAX_IDENTIFIER_LEN.saturating_sub(tail.len());
    let head: String = name.chars().take(keep).collect();
    format!("{}{}", head.trim_end_matches('_'), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_sanitization() {
        assert_eq!(sanitize_identifier("First Name"), "first_name");
        assert_eq!(sanitize_identifier("Revenue ($)"), "revenue");
        assert_eq!(sanitize_identifier("Signup Date"), "signup_date");
    }

    #[test]
    fn test_collapses_and_trims_underscores() {
        assert_eq!(sanitize_identifier("__a--b__"), "a_b");
        assert_eq!(sanitize_identifier("a   b"), "a_b");
        assert_eq!(sanitize_identifier("%total%"), "total");
    }

    #[test]
    fn test_idempotent() {
        for header in ["First Name", "Revenue ($)", "__x__y__", "Ünïcode höre"] {
            let once = sanitize_identifier(header);
            assert_eq!(sanitize_identifier(&once), once);
        }
    }

    #[test]
    fn test_charset_and_length_invariant() {
        let long = "A".repeat(200) + "!!!";
        let result = sanitize_identifier(&long);
        assert!(result.len() <= 63);
        assert!(result
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        assert!(!result.starts_with('_'));
        assert!(!result.ends_with('_'));
    }

    #[test]
    fn test_truncation_does_not_leave_trailing_underscore() {
        // 62 chars then a separator followed by more text: cutting at 63
        // would land on the underscore.
        let header = format!("{} tail", "a".repeat(62));
        let result = sanitize_identifier(&header);
        assert!(!result.ends_with('_'));
        assert_eq!(result, "a".repeat(62));
    }

    #[test]
    fn test_all_symbols_falls_back_to_position() {
        let headers = vec!["$$$".to_string(), "???".to_string()];
        assert_eq!(sanitize_headers(&headers), vec!["col_0", "col_1"]);
    }

    #[test]
    fn test_collision_gets_numeric_suffix() {
        let headers = vec![
            "Total".to_string(),
            "total".to_string(),
            "TOTAL!".to_string(),
        ];
        assert_eq!(
            sanitize_headers(&headers),
            vec!["total", "total_2", "total_3"]
        );
    }

    #[test]
    fn test_unique_headers_stay_unchanged() {
        let headers = vec!["Revenue".to_string(), "Signup Date".to_string()];
        assert_eq!(sanitize_headers(&headers), vec!["revenue", "signup_date"]);
    }
}
