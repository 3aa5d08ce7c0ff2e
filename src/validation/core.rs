//! Lenient extraction of fields from JSON request bodies
//!
//! The API handlers answer malformed or missing bodies with their own error
//! messages, so bodies are parsed here instead of through `web::Json`.

use serde_json::Value;

/// Parse a request body as a JSON object
///
/// Returns `None` for an empty body, invalid JSON, or any non-object value.
#[must_use]
pub fn parse_json_object(body: &[u8]) -> Option<Value> {
    serde_json::from_slice::<Value>(body)
        .ok()
        .filter(Value::is_object)
}

/// Extract a string field, treating `null` and non-strings as absent
#[must_use]
pub fn extract_optional_string(data: &Value, field_name: &str) -> Option<String> {
    data.get(field_name)
        .and_then(Value::as_str)
        .map(str::to_string)
}
