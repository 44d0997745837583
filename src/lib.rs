pub mod config;
pub mod correlation;
pub mod error;
pub mod server;
pub mod upstream;
pub mod utils;

pub use correlation::CorrelationId;
pub use error::{ApiError, ProxyError, UpstreamError};
pub use upstream::{LeadClient, TokenCache, UniversClient, Upstreams};
