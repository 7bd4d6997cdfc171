//! Utility functions shared by the tools

/// First `max_chars` characters of `s`, never splitting a multi-byte char.
/// Used to keep audit lines short when they quote user text.
pub fn preview(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_ascii() {
        assert_eq!(preview("hello world", 5), "hello");
        assert_eq!(preview("hello", 10), "hello");
        assert_eq!(preview("hello", 5), "hello");
    }

    #[test]
    fn test_preview_counts_chars_not_bytes() {
        // █ is 3 bytes in UTF-8
        assert_eq!(preview("abc█def", 4), "abc█");
        assert_eq!(preview("███", 2), "██");
    }

    #[test]
    fn test_preview_emoji() {
        // 🦀 is 4 bytes in UTF-8
        assert_eq!(preview("hi🦀bye", 3), "hi🦀");
        assert_eq!(preview("hi🦀bye", 2), "hi");
    }

    #[test]
    fn test_preview_zero_and_empty() {
        assert_eq!(preview("hello", 0), "");
        assert_eq!(preview("", 5), "");
    }
}
