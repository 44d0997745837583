use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error as ThisError;

/// Non-2xx answer from a partner API, normalized for the caller.
///
/// `payload` always holds something the caller can relay: the parsed upstream body, or
/// `{"raw": <text>}` when the body was not JSON.
#[derive(Debug, Clone, ThisError)]
#[error("{detail}")]
pub struct UpstreamError {
    pub status_code: StatusCode,
    pub detail: String,
    pub payload: Value,
}

impl UpstreamError {
    pub fn new(status_code: StatusCode, detail: impl Into<String>, payload: Value) -> Self {
        Self {
            status_code,
            detail: detail.into(),
            payload,
        }
    }
}

/// Picks a human-readable message out of an upstream error body.
///
/// `keys` are tried in order; a key whose value is `null`, `""` or otherwise empty is skipped.
/// Falls back to the raw body text.
pub(crate) fn extract_detail(payload: &Value, keys: &[&str], raw: &str) -> String {
    keys.iter()
        .filter_map(|key| payload.get(*key))
        .find_map(|value| match value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Array(items) if items.is_empty() => None,
            Value::Object(map) if map.is_empty() => None,
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| raw.to_string())
}
