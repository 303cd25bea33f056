/// Marker that precedes the video id in a watch URL
pub const WATCH_MARKER: &str = "watch?v=";

/// Derive the video identifier from an arbitrary reference.
///
/// Returns everything after the last `watch?v=` in `reference`, or the whole
/// reference when the marker is absent. Never fails: a malformed reference is
/// passed through and only surfaces when the caption lookup rejects it.
pub fn extract(reference: &str) -> &str {
    match reference.rsplit_once(WATCH_MARKER) {
        Some((_, id)) => id,
        None => reference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_watch_url() {
        assert_eq!(extract("https://x/watch?v=abc123"), "abc123");
        assert_eq!(extract("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_extract_keeps_trailing_query() {
        // Only the marker is stripped; anything after it stays in the id
        assert_eq!(extract("https://x/watch?v=abc&t=10"), "abc&t=10");
    }

    #[test]
    fn test_extract_uses_last_marker() {
        assert_eq!(extract("watch?v=first/watch?v=second"), "second");
    }

    #[test]
    fn test_extract_without_marker_is_identity() {
        for reference in ["dQw4w9WgXcQ", "https://youtu.be/dQw4w9WgXcQ", "", "not a url at all"] {
            assert_eq!(extract(reference), reference);
        }
    }

    #[test]
    fn test_extract_marker_at_end() {
        assert_eq!(extract("https://x/watch?v="), "");
    }
}
