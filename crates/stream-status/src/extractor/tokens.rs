//! Flat record tokenizer.
//!
//! This is not a JSON parser. Payloads are read as one level of
//! comma-separated `"key":value` fields; nested objects only contribute
//! brace noise at segment edges, which is stripped rather than parsed.
//! Field values never contain commas in the payloads handled here.

/// Comma-delimited segments with surrounding whitespace removed.
///
/// Empty segments are skipped, so runs of delimiters collapse.
pub fn raw_segments(payload: &str) -> impl Iterator<Item = &str> {
    payload.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Segments with one leading `{` and one trailing `}` removed.
pub fn segments(payload: &str) -> impl Iterator<Item = &str> {
    raw_segments(payload)
        .map(strip_braces)
        .filter(|s| !s.is_empty())
}

fn strip_braces(segment: &str) -> &str {
    let segment = segment.strip_prefix('{').unwrap_or(segment);
    let segment = segment.strip_suffix('}').unwrap_or(segment);
    segment.trim()
}

/// A `key:value` pair split on the first colon only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    /// Key as it appears in the payload, quotes included.
    pub key: &'a str,
    /// Everything after the first colon, or `None` when there is no colon.
    pub value: Option<&'a str>,
}

impl<'a> Field<'a> {
    /// Whether the key is `name` wrapped in double quotes.
    pub fn has_key(&self, name: &str) -> bool {
        self.key
            .strip_prefix('"')
            .and_then(|k| k.strip_suffix('"'))
            .is_some_and(|k| k == name)
    }
}

/// Split a segment into key and value. Values may embed colons.
pub fn split_field(segment: &str) -> Field<'_> {
    match segment.split_once(':') {
        Some((key, value)) => Field {
            key: key.trim(),
            value: Some(value.trim()),
        },
        None => Field {
            key: segment.trim(),
            value: None,
        },
    }
}

/// Fields of a payload, in order.
pub fn fields(payload: &str) -> impl Iterator<Item = Field<'_>> {
    segments(payload).map(split_field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_collapse_delimiters() {
        let parts: Vec<_> = segments("{\"a\":1,,\"b\":2}").collect();
        assert_eq!(parts, vec!["\"a\":1", "\"b\":2"]);
    }

    #[test]
    fn test_segments_strip_single_brace() {
        let parts: Vec<_> = segments("\"x\":{\"y\":null}}").collect();
        assert_eq!(parts, vec!["\"x\":{\"y\":null}"]);
    }

    #[test]
    fn test_segments_empty_payload() {
        assert_eq!(segments("").count(), 0);
        assert_eq!(segments("  ,  ,").count(), 0);
        assert_eq!(segments("{}").count(), 0);
    }

    #[test]
    fn test_split_field_keeps_embedded_colons() {
        let field = split_field("\"url\":\"https://example.com:8080\"");
        assert_eq!(field.key, "\"url\"");
        assert_eq!(field.value, Some("\"https://example.com:8080\""));
        assert!(field.has_key("url"));
    }

    #[test]
    fn test_split_field_without_colon() {
        let field = split_field("garbage");
        assert_eq!(field.key, "garbage");
        assert_eq!(field.value, None);
        assert!(!field.has_key("garbage"));
    }
}
