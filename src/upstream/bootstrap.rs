use std::sync::Arc;
use tracing::info;

use super::{HttpTransport, LeadClient, TokenCache, UniversClient};
use crate::config::{Config, ConfigError};

/// Every upstream client, wired once at startup and shared by all requests.
///
/// The [`TokenCache`] lives here so its lifetime is tied to the application rather than to
/// any global.
#[derive(Clone)]
pub struct Upstreams {
    pub leads: Arc<LeadClient>,
    pub univers: Arc<UniversClient>,
    pub tokens: Arc<TokenCache>,
    pub default_store: Arc<str>,
}

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl Upstreams {
    pub fn from_config(cfg: &Config) -> Result<Self, BootstrapError> {
        let univers_cfg = cfg.univers()?;
        let agrega_cfg = cfg.agrega()?;
        let retry = cfg.http.retry_policy();
        let transport = HttpTransport::from_config(&cfg.http)?;

        // Log resolved upstream configs here so `main` stays wiring-only.
        info!(
            http_timeout = ?cfg.http.timeout(),
            http_connect_timeout = ?cfg.http.connect_timeout(),
            retry_max_attempts = retry.max_attempts,
            retry_min_delay = ?retry.min_delay,
            retry_max_delay = ?retry.max_delay,
            "HTTP transport config (effective)"
        );
        info!(
            univers_base_url = %univers_cfg.base_url,
            univers_token_url = %univers_cfg.token_url,
            univers_client_id = %univers_cfg.client_id,
            univers_default_store = %univers_cfg.default_store,
            agrega_base_url = %agrega_cfg.base_url,
            "Upstream config (effective)"
        );

        let tokens = Arc::new(TokenCache::new(
            transport.clone(),
            (&univers_cfg).into(),
            retry,
        ));
        let univers = Arc::new(UniversClient::new(
            transport.clone(),
            &univers_cfg,
            Arc::clone(&tokens),
            retry,
        ));
        let leads = Arc::new(LeadClient::new(transport, &agrega_cfg, retry));

        Ok(Self {
            leads,
            univers,
            tokens,
            default_store: Arc::from(univers_cfg.default_store.as_str()),
        })
    }
}
