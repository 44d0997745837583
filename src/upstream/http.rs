use bytes::Bytes;
use reqwest::{StatusCode, header::HeaderMap};
use serde_json::{Value, json};
use std::borrow::Cow;

use crate::config::HttpConfig;
use crate::upstream::UPSTREAM_BODY_PREVIEW_CHARS;

pub const USER_AGENT: &str = concat!("univers-proxy/", env!("CARGO_PKG_VERSION"));

/// Single-shot outbound HTTP. One `execute` is exactly one request on the wire; retries are the
/// caller's concern.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Builds the shared reqwest client bounded by the configured total and connect timeouts.
    pub fn from_config(cfg: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(cfg.connect_timeout())
            .timeout(cfg.timeout())
            .build()?;

        Ok(Self::new(client))
    }

    /// Request builder entry point; the built request is handed back to [`Self::execute`].
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Sends one request and buffers the whole body. Every error here happened below the HTTP
    /// layer (connect, DNS, timeout, broken body stream).
    pub async fn execute(
        &self,
        request: reqwest::Request,
    ) -> Result<UpstreamResponse, reqwest::Error> {
        let method = request.method().clone();
        let url = request.url().clone();

        let resp = self.client.execute(request).await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;

        tracing::debug!(
            %method,
            url = %url,
            %status,
            body_len = body.len(),
            "Upstream responded"
        );

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

/// Raw upstream answer: status, headers and the fully buffered body.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn is_error(&self) -> bool {
        self.status.is_client_error() || self.status.is_server_error()
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Body parsed as JSON, or `{"raw": <text>}` when it is not valid JSON.
    pub fn json_or_raw(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|_| json!({ "raw": self.text() }))
    }

    pub(crate) fn preview(&self) -> String {
        format!("{:.len$}", self.text(), len = UPSTREAM_BODY_PREVIEW_CHARS)
    }
}
