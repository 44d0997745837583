use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// Service name reported in startup logs.
    /// TOML: `basic.app_name`. Env: `APP_NAME`. Default: `univers-proxy`.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Deployment environment label (e.g., "dev", "prod").
    /// TOML: `basic.app_env`. Env: `APP_ENV`. Default: `dev`.
    #[serde(default = "default_app_env")]
    pub app_env: String,

    /// HTTP server listen address (e.g., "0.0.0.0", "127.0.0.1").
    /// TOML: `basic.listen_addr`. Default: `0.0.0.0`.
    #[serde(default = "default_listen_ip")]
    pub listen_addr: IpAddr,

    /// HTTP server listen port.
    /// TOML: `basic.listen_port`. Default: `8000`.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Env: `LOG_LEVEL`. Default: `info`.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Log line format: `compact` or `json`.
    /// TOML: `basic.log_format`. Env: `LOG_FORMAT`. Default: `compact`.
    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            app_env: default_app_env(),
            listen_addr: default_listen_ip(),
            listen_port: default_listen_port(),
            loglevel: default_loglevel(),
            log_format: LogFormat::default(),
        }
    }
}

fn default_app_name() -> String {
    "univers-proxy".to_string()
}

fn default_app_env() -> String {
    "dev".to_string()
}

fn default_loglevel() -> String {
    "info".to_string()
}

/// Default IP address for the HTTP server listen address.
fn default_listen_ip() -> IpAddr {
    Ipv4Addr::new(0, 0, 0, 0).into()
}

/// Default port for the HTTP server.
fn default_listen_port() -> u16 {
    8000
}
