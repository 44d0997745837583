mod proxy;
mod upstream;

pub use proxy::{ApiError, ProxyError};
pub use upstream::UpstreamError;
pub(crate) use upstream::extract_detail;

/// Decides whether a failed upstream attempt may be tried again.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for ProxyError {
    /// Only failures below the HTTP layer; application errors are the caller's to judge.
    /// Requests that could not be built never reached the network and fail the same way again.
    fn is_retryable(&self) -> bool {
        match self {
            ProxyError::Transport(e) => {
                e.is_connect() || e.is_timeout() || e.is_request() || e.is_body()
            }
            _ => false,
        }
    }
}
