//! String utility functions

/// Truncate text to `max_len` characters and append `marker` when it is longer.
///
/// Lengths are counted in characters, so multi-byte text is never split
/// inside a code point. The result can exceed `max_len` by the marker length.
pub fn truncate_with_marker(text: &str, max_len: usize, marker: &str) -> String {
    match text.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}{}", &text[..cut], marker),
        None => text.to_string(),
    }
}

/// Like [`truncate_with_marker`], but also marks text of exactly `max_len` characters.
pub fn truncate_at_limit_with_marker(text: &str, max_len: usize, marker: &str) -> String {
    match text.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}{}", &text[..cut], marker),
        None if text.chars().count() == max_len => format!("{}{}", text, marker),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_with_marker_short_text_unchanged() {
        assert_eq!(truncate_with_marker("hello", 10, "..."), "hello");
    }

    #[test]
    fn test_truncate_with_marker_at_limit_unchanged() {
        assert_eq!(truncate_with_marker("hello", 5, "..."), "hello");
    }

    #[test]
    fn test_truncate_with_marker_over_limit() {
        assert_eq!(truncate_with_marker("hello world", 5, "..."), "hello...");
    }

    #[test]
    fn test_truncate_with_marker_counts_chars_not_bytes() {
        let text = "héllo wörld";
        let result = truncate_with_marker(text, 4, "~");
        assert_eq!(result, "héll~");
    }

    #[test]
    fn test_truncate_with_marker_empty() {
        assert_eq!(truncate_with_marker("", 0, "..."), "");
    }

    #[test]
    fn test_truncate_at_limit_marks_exact_length() {
        assert_eq!(truncate_at_limit_with_marker("hello", 5, "..."), "hello...");
    }

    #[test]
    fn test_truncate_at_limit_short_text_unchanged() {
        assert_eq!(truncate_at_limit_with_marker("hell", 5, "..."), "hell");
    }

    #[test]
    fn test_truncate_at_limit_over_limit() {
        assert_eq!(truncate_at_limit_with_marker("hello!", 5, "..."), "hello...");
    }
}
