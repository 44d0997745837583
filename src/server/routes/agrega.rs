use super::upstream_failure;
use crate::correlation::CorrelationId;
use crate::error::ApiError;
use crate::server::extract::ValidatedJson;
use crate::server::router::AppState;
use axum::{Json, Router, extract::State, routing::post};
use serde_json::Value;
use univers_proxy_schema::{CreateLead, UpdateLeadStatus};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/agrega/leads", post(create_lead_handler))
        .route("/agrega/leads/status", post(update_lead_status_handler))
}

async fn create_lead_handler(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    ValidatedJson(lead): ValidatedJson<CreateLead>,
) -> Result<Json<Value>, ApiError> {
    state
        .upstreams
        .leads
        .create_lead(&lead, &correlation_id)
        .await
        .map(Json)
        .map_err(upstream_failure("agrega", &correlation_id))
}

async fn update_lead_status_handler(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    ValidatedJson(update): ValidatedJson<UpdateLeadStatus>,
) -> Result<Json<Value>, ApiError> {
    state
        .upstreams
        .leads
        .update_lead_status(&update, &correlation_id)
        .await
        .map(Json)
        .map_err(upstream_failure("agrega", &correlation_id))
}
