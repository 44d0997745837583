use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::{ConfigError, deserialize_opt_string_lax};
use crate::upstream::RetryPolicy;

/// Outbound HTTP settings shared by every upstream client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Total request timeout in seconds.
    /// TOML: `http.timeout_secs`. Env: `HTTP_TIMEOUT_S`. Default: `20.0`.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    /// Connect timeout in seconds.
    /// TOML: `http.connect_timeout_secs`. Env: `HTTP_CONNECT_TIMEOUT_S`. Default: `5.0`.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: f64,

    /// Total attempts per upstream call (first try included).
    /// TOML: `http.retry_max_attempts`. Default: `3`.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: usize,

    /// Delay before the first retry; doubles on each further retry.
    /// TOML: `http.retry_min_delay_ms`. Default: `500`.
    #[serde(default = "default_retry_min_delay_ms")]
    pub retry_min_delay_ms: u64,

    /// Upper bound for the retry delay.
    /// TOML: `http.retry_max_delay_ms`. Default: `4000`.
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs.max(0.0))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.connect_timeout_secs.max(0.0))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_max_attempts.max(1),
            min_delay: Duration::from_millis(self.retry_min_delay_ms),
            max_delay: Duration::from_millis(self.retry_max_delay_ms),
            ..RetryPolicy::default()
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_min_delay_ms: default_retry_min_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

/// Configuration service (Univers) settings, including OAuth2 client credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UniversConfig {
    /// API base URL. Env: `UNIVERS_BASE_URL`. Required.
    #[serde(default)]
    pub base_url: Option<Url>,

    /// OAuth2 token endpoint. Env: `UNIVERS_TOKEN_URL`. Required.
    #[serde(default)]
    pub token_url: Option<Url>,

    /// Env: `UNIVERS_CLIENT_ID`. Required.
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub client_id: Option<String>,

    /// Env: `UNIVERS_CLIENT_SECRET`. Required.
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub client_secret: Option<String>,

    /// Store used by callers that do not name one.
    /// Env: `UNIVERS_DEFAULT_STORE`. Default: `DROGASIL`.
    #[serde(default = "default_store")]
    pub default_store: String,
}

#[derive(Clone)]
pub struct UniversResolvedConfig {
    pub base_url: Url,
    pub token_url: Url,
    pub client_id: String,
    pub client_secret: String,
    pub default_store: String,
}

impl std::fmt::Debug for UniversResolvedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniversResolvedConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("default_store", &self.default_store)
            .finish()
    }
}

impl UniversConfig {
    pub fn resolve(&self) -> Result<UniversResolvedConfig, ConfigError> {
        let base_url = self.base_url.clone().ok_or(ConfigError::Missing {
            key: "univers.base_url",
            env: "UNIVERS_BASE_URL",
        })?;
        let token_url = self.token_url.clone().ok_or(ConfigError::Missing {
            key: "univers.token_url",
            env: "UNIVERS_TOKEN_URL",
        })?;
        let client_id = required(&self.client_id, "univers.client_id", "UNIVERS_CLIENT_ID")?;
        let client_secret = required(
            &self.client_secret,
            "univers.client_secret",
            "UNIVERS_CLIENT_SECRET",
        )?;

        Ok(UniversResolvedConfig {
            base_url,
            token_url,
            client_id,
            client_secret,
            default_store: self.default_store.clone(),
        })
    }
}

impl Default for UniversConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token_url: None,
            client_id: None,
            client_secret: None,
            default_store: default_store(),
        }
    }
}

/// Lead service (Agrega) settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgregaConfig {
    /// API base URL. Env: `AGREGA_BASE_URL`. Required.
    #[serde(default)]
    pub base_url: Option<Url>,

    /// Static key sent as `x-api-key`. Env: `AGREGA_API_KEY`. Required.
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub api_key: Option<String>,
}

#[derive(Clone)]
pub struct AgregaResolvedConfig {
    /// Base URL with trailing slashes removed.
    pub base_url: String,
    pub api_key: String,
}

impl std::fmt::Debug for AgregaResolvedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgregaResolvedConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl AgregaConfig {
    pub fn resolve(&self) -> Result<AgregaResolvedConfig, ConfigError> {
        let base_url = self.base_url.as_ref().ok_or(ConfigError::Missing {
            key: "agrega.base_url",
            env: "AGREGA_BASE_URL",
        })?;
        let api_key = required(&self.api_key, "agrega.api_key", "AGREGA_API_KEY")?;

        Ok(AgregaResolvedConfig {
            base_url: trim_base(base_url),
            api_key,
        })
    }
}

fn required(
    value: &Option<String>,
    key: &'static str,
    env: &'static str,
) -> Result<String, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::Missing { key, env })
}

fn trim_base(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}

fn default_timeout_secs() -> f64 {
    20.0
}

fn default_connect_timeout_secs() -> f64 {
    5.0
}

fn default_retry_max_attempts() -> usize {
    3
}

fn default_retry_min_delay_ms() -> u64 {
    500
}

fn default_retry_max_delay_ms() -> u64 {
    4000
}

fn default_store() -> String {
    "DROGASIL".to_string()
}
