mod common;

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    routing::post,
};
use common::{CaptureState, app_for, send, spawn_test_server};
use serde_json::{Value, json};

const CREATE_PATH: &str = "/agrega/api/leads/cnpj/";
const STATUS_PATH: &str = "/agrega/api/leads/cnpj/atualizar_status";

async fn create_lead_handler(
    State(state): State<CaptureState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    state.record(CREATE_PATH, headers, &body);
    (
        StatusCode::CREATED,
        Json(json!({ "id": 42, "status": "recebido" })),
    )
}

async fn create_lead_conflict_handler(
    State(state): State<CaptureState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    state.record(CREATE_PATH, headers, &body);
    (
        StatusCode::CONFLICT,
        Json(json!({ "detail": "CNPJ já cadastrado" })),
    )
}

async fn create_lead_unavailable_handler(
    State(state): State<CaptureState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    state.record(CREATE_PATH, headers, &body);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "message": "indisponível" })),
    )
}

async fn update_status_handler(
    State(state): State<CaptureState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    state.record(STATUS_PATH, headers, &body);
    (StatusCode::OK, Json(json!({ "ok": true })))
}

fn valid_lead() -> Value {
    json!({
        "nome": "Farmacia Exemplo LTDA",
        "cnpj": "12345678000199",
        "sede": "Rua A, 100",
        "id_plataforma": "plug-1",
        "representante_legal": "Maria",
        "email": "maria@example.com",
        "whatsapp": "11987654321"
    })
}

fn post_json(uri: &str, cid: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("X-Correlation-Id", cid)
        .body(Body::from(body.to_string()))
        .expect("build request")
}

#[tokio::test]
async fn create_lead_forwards_payload_and_returns_upstream_body() {
    let captured = CaptureState::default();
    let mock = Router::new()
        .route(CREATE_PATH, post(create_lead_handler))
        .with_state(captured.clone());
    let base = spawn_test_server(mock).await;
    let app = app_for(&base);

    let (resp, body) = send(&app, post_json("/agrega/leads", "cid-lead", &valid_lead())).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body, json!({ "id": 42, "status": "recebido" }));

    let reqs = captured.hits(CREATE_PATH);
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].header("x-api-key"), Some("agrega-key"));
    assert_eq!(reqs[0].header("x-correlation-id"), Some("cid-lead"));
    assert_eq!(reqs[0].header("content-type"), Some("application/json"));
    assert_eq!(reqs[0].json(), valid_lead());
}

#[tokio::test]
async fn invalid_cnpj_is_rejected_before_any_upstream_call() {
    let captured = CaptureState::default();
    let mock = Router::new()
        .route(CREATE_PATH, post(create_lead_handler))
        .with_state(captured.clone());
    let base = spawn_test_server(mock).await;
    let app = app_for(&base);

    let mut lead = valid_lead();
    lead["cnpj"] = json!("12.345.678/0001-99");
    let (resp, body) = send(&app, post_json("/agrega/leads", "cid-bad", &lead)).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"]["correlationId"], json!("cid-bad"));
    assert_eq!(body["detail"]["upstream"], Value::Null);
    assert!(captured.hits(CREATE_PATH).is_empty());
}

#[tokio::test]
async fn missing_field_is_rejected() {
    let base = spawn_test_server(Router::new()).await;
    let app = app_for(&base);

    let mut lead = valid_lead();
    lead.as_object_mut().expect("object").remove("email");
    let (resp, body) = send(&app, post_json("/agrega/leads", "cid-missing", &lead)).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"]["correlationId"], json!("cid-missing"));
}

#[tokio::test]
async fn upstream_client_error_is_relayed_with_detail() {
    let captured = CaptureState::default();
    let mock = Router::new()
        .route(CREATE_PATH, post(create_lead_conflict_handler))
        .with_state(captured.clone());
    let base = spawn_test_server(mock).await;
    let app = app_for(&base);

    let (resp, body) = send(&app, post_json("/agrega/leads", "cid-409", &valid_lead())).await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(
        body,
        json!({
            "detail": {
                "message": "failed to create lead: CNPJ já cadastrado",
                "upstream": { "detail": "CNPJ já cadastrado" },
                "correlationId": "cid-409"
            }
        })
    );
    assert_eq!(captured.hits(CREATE_PATH).len(), 1);
}

#[tokio::test]
async fn upstream_server_error_is_not_retried_for_leads() {
    let captured = CaptureState::default();
    let mock = Router::new()
        .route(CREATE_PATH, post(create_lead_unavailable_handler))
        .with_state(captured.clone());
    let base = spawn_test_server(mock).await;
    let app = app_for(&base);

    let (resp, body) = send(&app, post_json("/agrega/leads", "cid-503", &valid_lead())).await;

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body["detail"]["message"],
        json!("failed to create lead: indisponível")
    );
    assert_eq!(captured.hits(CREATE_PATH).len(), 1);
}

#[tokio::test]
async fn status_update_forwards_id_and_status() {
    let captured = CaptureState::default();
    let mock = Router::new()
        .route(STATUS_PATH, post(update_status_handler))
        .with_state(captured.clone());
    let base = spawn_test_server(mock).await;
    let app = app_for(&base);

    let update = json!({ "id_plataforma": "plug-1", "status": "inativo" });
    let (resp, body) = send(&app, post_json("/agrega/leads/status", "cid-st", &update)).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let reqs = captured.hits(STATUS_PATH);
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].json(), update);
    assert_eq!(reqs[0].header("x-api-key"), Some("agrega-key"));
    assert_eq!(reqs[0].header("x-correlation-id"), Some("cid-st"));
}

#[tokio::test]
async fn unknown_status_value_is_rejected() {
    let captured = CaptureState::default();
    let mock = Router::new()
        .route(STATUS_PATH, post(update_status_handler))
        .with_state(captured.clone());
    let base = spawn_test_server(mock).await;
    let app = app_for(&base);

    let update = json!({ "id_plataforma": "plug-1", "status": "pausado" });
    let (resp, _) = send(&app, post_json("/agrega/leads/status", "cid-bad", &update)).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(captured.hits(STATUS_PATH).is_empty());
}
