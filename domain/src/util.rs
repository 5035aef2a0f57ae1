//! Text helpers for logs and console previews.

use std::borrow::Cow;

/// Longest prefix of `s` that fits in `max_bytes` and ends on a char
/// boundary.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let end = (0..=max_bytes)
        .rev()
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(0);
    &s[..end]
}

/// Like [`truncate_str`], with `...` appended when anything was cut.
pub fn preview(s: &str, max_bytes: usize) -> Cow<'_, str> {
    let head = truncate_str(s, max_bytes);
    if head.len() == s.len() {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(format!("{}...", head))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_input_is_untouched() {
        assert_eq!(truncate_str("Oslo", 10), "Oslo");
        assert!(matches!(preview("Oslo", 4), Cow::Borrowed("Oslo")));
    }

    #[test]
    fn test_cut_on_char_boundary() {
        // 'ø' spans bytes 5..7
        assert_eq!(truncate_str("Tromsø", 6), "Troms");
        assert_eq!(truncate_str("øst", 1), "");
        assert_eq!(truncate_str("forecast", 4), "fore");
    }

    #[test]
    fn test_preview_marks_truncation() {
        assert_eq!(preview(r#"{"temp":3,"wind":12}"#, 9), r#"{"temp":3..."#);
        assert_eq!(preview("", 0), "");
    }
}
