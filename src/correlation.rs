use reqwest::header::{HeaderMap, HeaderName};
use std::fmt;

/// Header carrying the trace id across every hop (inbound, outbound and response).
pub const CORRELATION_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

/// Opaque, non-empty trace token propagated unchanged to every upstream call and log line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Returns `None` for an empty string; no other validation is applied.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        (!value.is_empty()).then_some(Self(value))
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(CORRELATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(Self::new)
    }

    /// Inbound header value when present and non-empty, otherwise a fresh UUID.
    pub fn from_headers_or_generate(headers: &HeaderMap) -> Self {
        Self::from_headers(headers).unwrap_or_else(Self::generate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn empty_header_falls_back_to_generated_uuid() {
        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_HEADER, HeaderValue::from_static(""));

        let cid = CorrelationId::from_headers_or_generate(&headers);
        assert!(uuid::Uuid::parse_str(cid.as_str()).is_ok());
    }

    #[test]
    fn inbound_value_is_kept_verbatim() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-correlation-id"),
            HeaderValue::from_static("test-123"),
        );

        let cid = CorrelationId::from_headers_or_generate(&headers);
        assert_eq!(cid.as_str(), "test-123");
    }
}
