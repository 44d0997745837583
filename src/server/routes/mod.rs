pub mod agrega;
pub mod customize;
pub mod health;

use crate::correlation::CorrelationId;
use crate::error::{ApiError, ProxyError};
use tracing::warn;

/// Logs a failed upstream call with its correlation id and binds the id to the error.
pub(crate) fn upstream_failure<'a>(
    channel: &'static str,
    correlation_id: &'a CorrelationId,
) -> impl FnOnce(ProxyError) -> ApiError + 'a {
    move |error| {
        warn!(
            channel,
            status_code = error.status_code().as_u16(),
            detail = %error,
            correlation_id = %correlation_id,
            "upstream_error"
        );
        ApiError::new(error, correlation_id)
    }
}
