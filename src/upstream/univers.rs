use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use super::http::HttpTransport;
use super::retry::{RetryPolicy, transport_or_server_error, with_retry};
use super::token::TokenCache;
use crate::config::UniversResolvedConfig;
use crate::correlation::{CORRELATION_HEADER, CorrelationId};
use crate::error::{ProxyError, UpstreamError, extract_detail};

/// Passthrough client for the configuration service.
///
/// Each attempt asks the shared [`TokenCache`] for a bearer token first. Transport failures and
/// 5xx answers are retried; 4xx answers fail on the first attempt.
pub struct UniversClient {
    transport: HttpTransport,
    base_url: Url,
    tokens: Arc<TokenCache>,
    retry: RetryPolicy,
}

impl UniversClient {
    pub fn new(
        transport: HttpTransport,
        cfg: &UniversResolvedConfig,
        tokens: Arc<TokenCache>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            base_url: cfg.base_url.clone(),
            tokens,
            retry,
        }
    }

    pub async fn get_customize_configuration(
        &self,
        store: &str,
        correlation_id: &CorrelationId,
    ) -> Result<Value, ProxyError> {
        info!(
            correlation_id = %correlation_id,
            store,
            "[Univers] Get customize configuration"
        );

        with_retry(
            &self.retry,
            "customize_configuration",
            correlation_id,
            || async move { self.fetch_configuration(store, correlation_id).await },
            transport_or_server_error,
        )
        .await
    }

    /// `{base}/store/{store}/customize/configuration`, with `store` percent-encoded as one segment.
    pub(crate) fn configuration_url(&self, store: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["store", store, "customize", "configuration"]);
        }
        url
    }

    pub(crate) fn build_configuration_request(
        &self,
        store: &str,
        access_token: &str,
        correlation_id: &CorrelationId,
    ) -> Result<reqwest::Request, reqwest::Error> {
        self.transport
            .client()
            .get(self.configuration_url(store))
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .header(ACCEPT, "application/json")
            .header(CORRELATION_HEADER, correlation_id.as_str())
            .build()
    }

    async fn fetch_configuration(
        &self,
        store: &str,
        correlation_id: &CorrelationId,
    ) -> Result<Value, ProxyError> {
        let access_token = self.tokens.get(correlation_id).await?;
        let req = self.build_configuration_request(store, &access_token, correlation_id)?;
        let resp = self.transport.execute(req).await?;

        let payload = resp.json_or_raw();

        if resp.is_error() {
            let detail = extract_detail(&payload, &["message", "detail"], &resp.text());
            warn!(
                correlation_id = %correlation_id,
                store,
                status = %resp.status,
                body = %resp.preview(),
                "[Univers] Upstream error"
            );
            return Err(UpstreamError::new(
                resp.status,
                format!("upstream error {}: {detail}", resp.status.as_u16()),
                payload,
            )
            .into());
        }

        Ok(payload)
    }
}
