//! Small text helpers shared by the services

/// Truncate `s` to at most `max_chars` characters.
///
/// Counts characters, not bytes, so multi-byte text never splits inside a
/// code point.
pub fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Treat blank strings as absent
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("", 3), "");
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("abcdef", 3), "abc");
        // "m²" is two chars, three bytes
        assert_eq!(truncate("12 m² total", 5), "12 m²");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(Some(" sk-1 ".to_string())), Some("sk-1".to_string()));
    }
}
