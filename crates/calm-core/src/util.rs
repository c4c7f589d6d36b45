//! Shared utility functions used across multiple modules.

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Current Unix timestamp in milliseconds.
pub fn unix_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Take at most `max_chars` characters of `value`, then trim both ends.
pub fn truncate_trimmed(value: &str, max_chars: usize) -> String {
    let truncated = match value.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &value[..byte_index],
        None => value,
    };
    truncated.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_option_rejects_empty() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some("   ".to_string())), None);
    }

    #[test]
    fn normalize_text_option_trims_value() {
        assert_eq!(
            normalize_text_option(Some(" /tmp/notes.db ".to_string())),
            Some("/tmp/notes.db".to_string())
        );
    }

    #[test]
    fn truncate_trimmed_counts_characters_not_bytes() {
        assert_eq!(truncate_trimmed("héllo wörld", 5), "héllo");
        assert_eq!(truncate_trimmed("ab", 5), "ab");
    }

    #[test]
    fn truncate_trimmed_trims_after_cutting() {
        assert_eq!(truncate_trimmed("  hi there", 5), "hi");
        assert_eq!(truncate_trimmed("   ", 10), "");
    }

    #[test]
    fn unix_timestamp_millis_is_positive() {
        assert!(unix_timestamp_millis() > 0);
    }
}
