/// Marker appended to truncated text
pub const ELLIPSIS: &str = "...";

/// Truncate `text` to at most `max_chars` characters.
///
/// Lengths are counted in `char`s, never bytes, so multi-byte text is never
/// split mid-character. Truncated output ends with [`ELLIPSIS`] and is exactly
/// `max_chars` long.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let marker_len = ELLIPSIS.chars().count();
    if max_chars < marker_len {
        return text.chars().take(max_chars).collect();
    }

    let mut out: String = text.chars().take(max_chars - marker_len).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_untouched() {
        assert_eq!(truncate_with_ellipsis("hello", 10), "hello");
        assert_eq!(truncate_with_ellipsis("hello", 5), "hello");
        assert_eq!(truncate_with_ellipsis("", 0), "");
    }

    #[test]
    fn test_long_text_is_cut_to_cap() {
        let text = "a".repeat(800);
        let out = truncate_with_ellipsis(&text, 700);
        assert_eq!(out.chars().count(), 700);
        assert!(out.ends_with(ELLIPSIS));
        assert!(out.starts_with("aaa"));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = "é".repeat(10);
        let out = truncate_with_ellipsis(&text, 6);
        assert_eq!(out, "ééé...");
    }

    #[test]
    fn test_tiny_cap_skips_marker() {
        assert_eq!(truncate_with_ellipsis("abcdef", 2), "ab");
    }
}
