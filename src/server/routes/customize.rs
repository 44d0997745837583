use super::upstream_failure;
use crate::correlation::CorrelationId;
use crate::error::ApiError;
use crate::server::router::AppState;
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde_json::Value;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/store/{store}/customize/configuration",
            get(store_configuration_handler),
        )
        .route(
            "/customize/configuration",
            get(default_store_configuration_handler),
        )
}

async fn store_configuration_handler(
    State(state): State<AppState>,
    Path(store): Path<String>,
    correlation_id: CorrelationId,
) -> Result<Json<Value>, ApiError> {
    fetch(&state, &store, &correlation_id).await
}

/// Same passthrough for the store configured as `univers.default_store`.
async fn default_store_configuration_handler(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
) -> Result<Json<Value>, ApiError> {
    let store = state.upstreams.default_store.clone();
    fetch(&state, &store, &correlation_id).await
}

async fn fetch(
    state: &AppState,
    store: &str,
    correlation_id: &CorrelationId,
) -> Result<Json<Value>, ApiError> {
    state
        .upstreams
        .univers
        .get_customize_configuration(store, correlation_id)
        .await
        .map(Json)
        .map_err(upstream_failure("univers", correlation_id))
}
