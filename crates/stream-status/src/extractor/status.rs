use std::fmt;

use super::tokens;

/// Prefix of the first segment of a "not found" response.
pub const NOT_FOUND_MARKER: &str = r#"{"error":"Not Found""#;

/// Segment reported for a channel that is not currently streaming.
pub const NULL_STREAM_MARKER: &str = r#""stream":null"#;

/// Verdict of a single status poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Online,
    Offline,
    /// The identifier does not exist on the platform.
    NotFound,
}

impl Classification {
    pub fn is_online(&self) -> bool {
        matches!(self, Classification::Online)
    }

    /// Whether polling this identifier can never succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Classification::NotFound)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Online => write!(f, "online"),
            Classification::Offline => write!(f, "offline"),
            Classification::NotFound => write!(f, "not found"),
        }
    }
}

/// Classify a status endpoint payload.
///
/// The first segment is checked for the not-found marker before anything
/// else. Otherwise a single `"stream":null` segment anywhere is conclusive
/// for [`Classification::Offline`]; any other non-empty record is
/// [`Classification::Online`]. A payload that does not open a record, such
/// as an HTML error page, or has no usable segments is treated as offline.
pub fn classify_status(payload: &str) -> Classification {
    let Some(first) = tokens::raw_segments(payload).next() else {
        return Classification::Offline;
    };

    if first.starts_with(NOT_FOUND_MARKER) {
        return Classification::NotFound;
    }
    if !first.starts_with('{') {
        return Classification::Offline;
    }

    let mut seen_any = false;
    for segment in tokens::segments(payload) {
        if segment == NULL_STREAM_MARKER {
            return Classification::Offline;
        }
        seen_any = true;
    }

    if seen_any {
        Classification::Online
    } else {
        Classification::Offline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_first_segment() {
        assert_eq!(
            classify_status(r#"{"error":"Not Found","status":404,"message":"Channel 'alice' does not exist"}"#),
            Classification::NotFound
        );
        assert_eq!(
            classify_status(r#"{"error":"Not Found"}"#),
            Classification::NotFound
        );
    }

    #[test]
    fn test_not_found_ignores_trailing_content() {
        let payload = r#"{"error":"Not Found","stream":null,"anything":"else"}"#;
        assert_eq!(classify_status(payload), Classification::NotFound);
    }

    #[test]
    fn test_not_found_only_in_first_segment() {
        let payload = r#"{"stream":{"_id":1},"error":"Not Found"}"#;
        assert_eq!(classify_status(payload), Classification::Online);
    }

    #[test]
    fn test_null_stream_last() {
        let payload = r#"{"_links":{"self":"https://api.twitch.tv/kraken/streams/bob"},"stream":null}"#;
        assert_eq!(classify_status(payload), Classification::Offline);
    }

    #[test]
    fn test_null_stream_first() {
        let payload = r#"{"stream":null,"_links":{"self":"https://api.twitch.tv/kraken/streams/bob"}}"#;
        assert_eq!(classify_status(payload), Classification::Offline);
    }

    #[test]
    fn test_null_stream_only_field() {
        assert_eq!(classify_status(r#"{"stream":null}"#), Classification::Offline);
    }

    #[test]
    fn test_live_stream() {
        let payload = r#"{"stream":{"_id":23932774784,"game":"BATMAN: Arkham City","viewers":7254,"created_at":"2016-12-14T22:49:56Z"},"_links":{"self":"https://api.twitch.tv/kraken/streams/bob"}}"#;
        assert_eq!(classify_status(payload), Classification::Online);
    }

    #[test]
    fn test_empty_and_malformed_are_offline() {
        assert_eq!(classify_status(""), Classification::Offline);
        assert_eq!(classify_status("   \n"), Classification::Offline);
        assert_eq!(classify_status(",,,"), Classification::Offline);
        assert_eq!(classify_status("{}"), Classification::Offline);
    }

    #[test]
    fn test_non_record_payloads_are_offline() {
        let html = "<html><head><title>503 Service Temporarily Unavailable</title></head>\
                    <body><h1>503 Service Temporarily Unavailable</h1></body></html>";
        assert_eq!(classify_status(html), Classification::Offline);
        assert_eq!(classify_status("Service Unavailable"), Classification::Offline);
        assert_eq!(classify_status("upstream error, retry later"), Classification::Offline);
        assert_eq!(classify_status(r#"["stream",{"_id":1}]"#), Classification::Offline);
    }

    #[test]
    fn test_trailing_newline() {
        assert_eq!(
            classify_status("{\"_links\":{},\"stream\":null}\n"),
            Classification::Offline
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Classification::Online.to_string(), "online");
        assert_eq!(Classification::NotFound.to_string(), "not found");
        assert!(Classification::NotFound.is_fatal());
        assert!(!Classification::Offline.is_fatal());
    }
}
