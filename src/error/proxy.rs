use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::{Value, json};
use thiserror::Error as ThisError;
use univers_proxy_schema::{ErrorEnvelope, ErrorResponseBody};

use super::upstream::UpstreamError;
use crate::correlation::CorrelationId;

#[derive(Debug, ThisError)]
pub enum ProxyError {
    /// Failure below the HTTP layer, or a request that could not be built; no upstream
    /// status exists.
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Inbound request refused before any upstream call.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl ProxyError {
    pub fn rejected(message: impl Into<String>) -> Self {
        ProxyError::Rejected {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ProxyError::Transport(_))
    }

    /// Status code relayed to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Transport(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Transport(e) if e.is_builder() => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Transport(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Upstream(e) => e.status_code,
            ProxyError::Rejected { status, .. } => *status,
        }
    }

    /// Upstream body relayed to the caller.
    pub fn payload(&self) -> Value {
        match self {
            ProxyError::Transport(e) => json!({ "raw": e.to_string() }),
            ProxyError::Upstream(e) => e.payload.clone(),
            ProxyError::Rejected { .. } => Value::Null,
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        ProxyError::Transport(e)
    }
}

/// A [`ProxyError`] bound to the correlation id of the request that produced it.
#[derive(Debug)]
pub struct ApiError {
    pub error: ProxyError,
    pub correlation_id: CorrelationId,
}

impl ApiError {
    pub fn new(error: ProxyError, correlation_id: &CorrelationId) -> Self {
        Self {
            error,
            correlation_id: correlation_id.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.error.status_code();
        let body = ErrorResponseBody::from(ErrorEnvelope {
            message: self.error.to_string(),
            upstream: self.error.payload(),
            correlation_id: self.correlation_id.into_string(),
        });
        (status, Json(body)).into_response()
    }
}
