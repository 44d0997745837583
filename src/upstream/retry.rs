use backon::{ExponentialBuilder, Retryable};
use std::future::Future;
use std::time::Duration;

use crate::correlation::CorrelationId;
use crate::error::{IsRetryable, ProxyError};

/// Bounded exponential retry: `max_attempts` total tries, first delay `min_delay`, each further
/// delay multiplied by `factor`, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub factor: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(4),
            factor: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_factor(self.factor)
            .with_max_times(self.max_attempts.saturating_sub(1))
    }

    /// Delays slept before each retry, in order. Its length is `max_attempts - 1`.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        backon::BackoffBuilder::build(self.backoff())
    }
}

/// Accepts transport failures only.
pub fn transport_only(err: &ProxyError) -> bool {
    err.is_retryable()
}

/// Accepts transport failures and upstream 5xx answers.
pub fn transport_or_server_error(err: &ProxyError) -> bool {
    match err {
        ProxyError::Upstream(e) => e.status_code.is_server_error(),
        other => other.is_retryable(),
    }
}

/// Runs `op` until it succeeds, `should_retry` rejects the error, or the attempt budget is
/// spent. The last error is returned as-is.
pub async fn with_retry<T, F, Fut, P>(
    policy: &RetryPolicy,
    operation: &'static str,
    correlation_id: &CorrelationId,
    op: F,
    should_retry: P,
) -> Result<T, ProxyError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProxyError>>,
    P: FnMut(&ProxyError) -> bool,
{
    let mut attempt = 1usize;

    op.retry(policy.backoff())
        .when(should_retry)
        .notify(|err: &ProxyError, dur: Duration| {
            tracing::warn!(
                operation,
                correlation_id = %correlation_id,
                attempt,
                status = %err.status_code(),
                error = %err,
                "Upstream attempt failed; retrying in {:?}",
                dur
            );
            attempt += 1;
        })
        .await
}
