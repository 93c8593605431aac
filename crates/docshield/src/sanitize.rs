//! Helpers for sanitizing data before it enters log lines and span fields.
//!
//! Uploaded documents are expected to contain PII, so their storage paths,
//! full ids and raw error bodies are kept out of logs.

/// Maximum length for error bodies kept in error messages.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Returns only the last path component of a path or URI.
///
/// - `uploads/20240101_120000_passport.pdf` → `20240101_120000_passport.pdf`
/// - `https://host/redacted/x_redacted.pdf?sig=abc` → `x_redacted.pdf`
pub fn redact_path(path: &str) -> String {
    let without_query = path.split(['?', '#']).next().unwrap_or(path);
    without_query
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Shortens a document id for log correlation: first four characters plus length.
pub fn redact_id(id: &str) -> String {
    let prefix: String = id.chars().take(4).collect();
    if prefix.len() == id.len() {
        prefix
    } else {
        format!("{}…({})", prefix, id.chars().count())
    }
}

/// Truncates a response body to a bounded length on a character boundary.
pub fn truncate_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_LENGTH {
        let truncated: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
        format!("{}... (truncated)", truncated)
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_path_returns_filename() {
        assert_eq!(
            redact_path("uploads/20240101_120000_passport.pdf"),
            "20240101_120000_passport.pdf"
        );
        assert_eq!(
            redact_path("https://host/redacted/x_redacted.pdf?sig=abc"),
            "x_redacted.pdf"
        );
        assert_eq!(redact_path("C:\\data\\scan.png"), "scan.png");
    }

    #[test]
    fn test_redact_path_no_filename() {
        assert_eq!(redact_path("/"), "<unknown>");
        assert_eq!(redact_path(""), "<unknown>");
    }

    #[test]
    fn test_redact_id() {
        assert_eq!(redact_id("abc"), "abc");
        assert_eq!(redact_id("20240101_120000"), "2024…(15)");
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short"), "short");

        let long = "ä".repeat(300);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("... (truncated)"));
        assert_eq!(truncated.chars().filter(|c| *c == 'ä').count(), 200);
    }
}
