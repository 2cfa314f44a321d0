//! Shared utility functions

/// Truncate a string for terminal output, appending "..." if shortened.
/// Never splits a multi-byte character.
pub fn truncate_for_display(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let suffix = "...";
    let mut end = max_len.saturating_sub(suffix.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &s[..end], suffix)
}

/// Whether a report path asks for JSON output
pub fn is_json_path(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_short_string_untouched() {
        assert_eq!(truncate_for_display("https://ics.uci.edu", 60), "https://ics.uci.edu");
    }

    #[test]
    fn test_truncates_on_char_boundary() {
        assert_eq!(truncate_for_display("abcdefghij", 8), "abcde...");
        // 'é' is two bytes; a cut inside it backs off to the previous boundary
        assert_eq!(truncate_for_display("ééééé", 6), "é...");
    }

    #[test]
    fn test_json_path() {
        assert!(is_json_path(Path::new("report.json")));
        assert!(is_json_path(Path::new("out/REPORT.JSON")));
        assert!(!is_json_path(Path::new("report.txt")));
        assert!(!is_json_path(Path::new("report")));
    }
}
