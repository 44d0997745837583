mod basic;
mod upstreams;

pub use basic::{BasicConfig, LogFormat};
pub use upstreams::{
    AgregaConfig, AgregaResolvedConfig, HttpConfig, UniversConfig, UniversResolvedConfig,
};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Outbound HTTP timeouts and retry budget (see `http` table).
    #[serde(default)]
    pub http: HttpConfig,

    /// Configuration service + OAuth2 client credentials (see `univers` table).
    #[serde(default)]
    pub univers: UniversConfig,

    /// Lead service (see `agrega` table).
    #[serde(default)]
    pub agrega: AgregaConfig,
}

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("missing required setting `{key}` (env: {env})")]
    Missing {
        key: &'static str,
        env: &'static str,
    },
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";

type EnvKeys = &'static [(&'static str, &'static str)];

/// Flat environment names mapped onto their nested config keys. Values are parsed,
/// so `LISTEN_PORT=9000` lands as a number.
const ENV_KEYS: EnvKeys = &[
    ("LOG_FORMAT", "basic.log_format"),
    ("LISTEN_ADDR", "basic.listen_addr"),
    ("LISTEN_PORT", "basic.listen_port"),
    ("HTTP_TIMEOUT_S", "http.timeout_secs"),
    ("HTTP_CONNECT_TIMEOUT_S", "http.connect_timeout_secs"),
    ("HTTP_RETRY_MAX_ATTEMPTS", "http.retry_max_attempts"),
    ("UNIVERS_BASE_URL", "univers.base_url"),
    ("UNIVERS_TOKEN_URL", "univers.token_url"),
    ("AGREGA_BASE_URL", "agrega.base_url"),
];

/// Names whose values are taken verbatim: `AGREGA_API_KEY=0123` stays `"0123"`.
const ENV_STRING_KEYS: EnvKeys = &[
    ("APP_NAME", "basic.app_name"),
    ("APP_ENV", "basic.app_env"),
    ("LOG_LEVEL", "basic.loglevel"),
    ("UNIVERS_CLIENT_ID", "univers.client_id"),
    ("UNIVERS_CLIENT_SECRET", "univers.client_secret"),
    ("UNIVERS_DEFAULT_STORE", "univers.default_store"),
    ("AGREGA_API_KEY", "agrega.api_key"),
];

impl Config {
    /// Builds a Figment that merges defaults, an optional `config.toml`, then the environment.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        };
        let figment = figment.merge(keyed_env(ENV_KEYS));
        keyed_env(ENV_STRING_KEYS)
            .iter()
            .fold(figment, |figment, (key, value)| {
                figment.merge(Serialized::default(key.as_str(), value))
            })
    }

    /// Loads configuration and checks that every upstream setting is present.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let cfg: Self = figment.extract().map_err(Box::new)?;
        cfg.univers()?;
        cfg.agrega()?;
        Ok(cfg)
    }

    pub fn univers(&self) -> Result<UniversResolvedConfig, ConfigError> {
        self.univers.resolve()
    }

    pub fn agrega(&self) -> Result<AgregaResolvedConfig, ConfigError> {
        self.agrega.resolve()
    }
}

fn keyed_env(keys: EnvKeys) -> Env {
    Env::raw().filter_map(move |key| {
        keys.iter()
            .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
            .map(|(_, path)| (*path).into())
    })
}

/// Accepts strings or bare numbers, e.g. `client_id = 1234` in config.toml.
fn deserialize_opt_string_lax<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;

    match v {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(serde::de::Error::custom("expected a string or a number")),
    }
}
