use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use univers_proxy_schema::{CreateLead, UpdateLeadStatus};

use super::http::HttpTransport;
use super::retry::{RetryPolicy, transport_only, with_retry};
use crate::config::AgregaResolvedConfig;
use crate::correlation::{CORRELATION_HEADER, CorrelationId};
use crate::error::{ProxyError, UpstreamError, extract_detail};

const CREATE_LEAD_PATH: &str = "/api/leads/cnpj/";
const UPDATE_STATUS_PATH: &str = "/api/leads/cnpj/atualizar_status";
const API_KEY_HEADER: &str = "x-api-key";

/// Passthrough client for the lead service, authenticated with a static API key.
///
/// Only transport failures are retried; every HTTP answer, 5xx included, is final.
pub struct LeadClient {
    transport: HttpTransport,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl LeadClient {
    pub fn new(transport: HttpTransport, cfg: &AgregaResolvedConfig, retry: RetryPolicy) -> Self {
        Self {
            transport,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            retry,
        }
    }

    pub async fn create_lead(
        &self,
        lead: &CreateLead,
        correlation_id: &CorrelationId,
    ) -> Result<Value, ProxyError> {
        info!(
            correlation_id = %correlation_id,
            id_plataforma = %lead.id_plataforma,
            "[Agrega] Create lead"
        );
        self.post(
            "create_lead",
            CREATE_LEAD_PATH,
            lead,
            "failed to create lead",
            correlation_id,
        )
        .await
    }

    pub async fn update_lead_status(
        &self,
        update: &UpdateLeadStatus,
        correlation_id: &CorrelationId,
    ) -> Result<Value, ProxyError> {
        info!(
            correlation_id = %correlation_id,
            id_plataforma = %update.id_plataforma,
            status = %update.status,
            "[Agrega] Update lead status"
        );
        self.post(
            "update_lead_status",
            UPDATE_STATUS_PATH,
            update,
            "failed to update lead status",
            correlation_id,
        )
        .await
    }

    pub(crate) fn build_request<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        correlation_id: &CorrelationId,
    ) -> Result<reqwest::Request, reqwest::Error> {
        self.transport
            .client()
            .post(format!("{}{}", self.base_url, path))
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, self.api_key.as_str())
            .header(CORRELATION_HEADER, correlation_id.as_str())
            .json(body)
            .build()
    }

    async fn post<T: Serialize>(
        &self,
        operation: &'static str,
        path: &str,
        body: &T,
        failure: &str,
        correlation_id: &CorrelationId,
    ) -> Result<Value, ProxyError> {
        let resp = with_retry(
            &self.retry,
            operation,
            correlation_id,
            || async move {
                let req = self.build_request(path, body, correlation_id)?;
                Ok::<_, ProxyError>(self.transport.execute(req).await?)
            },
            transport_only,
        )
        .await?;

        let payload = resp.json_or_raw();

        if resp.is_error() {
            let detail = extract_detail(&payload, &["detail", "message"], &resp.text());
            warn!(
                correlation_id = %correlation_id,
                operation,
                status = %resp.status,
                body = %resp.preview(),
                "[Agrega] Upstream error"
            );
            return Err(UpstreamError::new(resp.status, format!("{failure}: {detail}"), payload).into());
        }

        Ok(payload)
    }
}
