use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body returned to callers for any failed request.
///
/// `upstream` carries the partner's response body (or `{"raw": ...}` when it was not JSON),
/// `null` when the request never reached an upstream.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorEnvelope {
    pub message: String,
    pub upstream: Value,
    #[serde(rename = "correlationId")]
    pub correlation_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorResponseBody {
    #[serde(rename = "detail")]
    pub inner: ErrorEnvelope,
}

impl From<ErrorEnvelope> for ErrorResponseBody {
    fn from(inner: ErrorEnvelope) -> Self {
        Self { inner }
    }
}
