use crate::correlation::CorrelationId;
use crate::error::{ApiError, ProxyError};
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use tracing::debug;
use univers_proxy_schema::{CreateLead, LeadValidationError, UpdateLeadStatus};

impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    /// Id placed by the correlation middleware; outside it, falls back to the header or a new id.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CorrelationId>()
            .cloned()
            .unwrap_or_else(|| CorrelationId::from_headers_or_generate(&parts.headers)))
    }
}

/// Field-level rules checked after deserialization.
pub trait Validate {
    fn validate(&self) -> Result<(), LeadValidationError>;
}

impl Validate for CreateLead {
    fn validate(&self) -> Result<(), LeadValidationError> {
        CreateLead::validate(self)
    }
}

impl Validate for UpdateLeadStatus {
    fn validate(&self) -> Result<(), LeadValidationError> {
        UpdateLeadStatus::validate(self)
    }
}

/// JSON body that passed both deserialization and [`Validate`].
///
/// Failures are answered with the error envelope: the JSON rejection's own status for
/// syntax/shape problems, 422 for rule violations.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = req
            .extensions()
            .get::<CorrelationId>()
            .cloned()
            .unwrap_or_else(|| CorrelationId::from_headers_or_generate(req.headers()));

        let Json(body) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            debug!(
                correlation_id = %correlation_id,
                error = %rejection.body_text(),
                "Rejected request body"
            );
            ApiError::new(
                ProxyError::Rejected {
                    status: rejection.status(),
                    message: rejection.body_text(),
                },
                &correlation_id,
            )
        })?;

        body.validate().map_err(|e| {
            debug!(
                correlation_id = %correlation_id,
                error = %e,
                "Request body failed validation"
            );
            ApiError::new(ProxyError::rejected(e.to_string()), &correlation_id)
        })?;

        Ok(Self(body))
    }
}
