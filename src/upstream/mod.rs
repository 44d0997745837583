pub mod agrega;
pub mod http;
pub mod retry;
pub mod token;
pub mod univers;

mod bootstrap;

pub use agrega::LeadClient;
pub use bootstrap::{BootstrapError, Upstreams};
pub use http::{HttpTransport, UpstreamResponse};
pub use retry::{RetryPolicy, transport_only, transport_or_server_error, with_retry};
pub use token::{ClientCredentials, Token, TokenCache};
pub use univers::UniversClient;

/// Upstream bodies are cut to this many chars in log lines.
pub const UPSTREAM_BODY_PREVIEW_CHARS: usize = 300;
