use super::tokens;

/// Upper bound on the segments scanned for a field.
pub const MAX_SCANNED_SEGMENTS: usize = 35;

/// Extract the value of a top-level `"key":value` field.
///
/// Only the first colon separates key and value, so values keep embedded
/// colons. Surrounding quotes are removed and a `null` value reads as
/// empty. Returns an empty string when the field is absent.
pub fn extract_field(payload: &str, key: &str) -> String {
    tokens::fields(payload)
        .take(MAX_SCANNED_SEGMENTS)
        .find(|field| field.value.is_some() && field.has_key(key))
        .and_then(|field| field.value)
        .map(clean_value)
        .unwrap_or_default()
}

/// Current game of a channel payload.
pub fn extract_game(payload: &str) -> String {
    extract_field(payload, "game")
}

fn clean_value(value: &str) -> String {
    let value = value.trim_end_matches('}').trim();
    if value == "null" {
        return String::new();
    }
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}
