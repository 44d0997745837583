#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, Response},
};
use serde_json::Value;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use tokio::net::TcpListener;
use tower::ServiceExt;
use url::Url;

#[derive(Debug, Clone)]
pub struct Captured {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("captured body was not json")
    }
}

/// Shared between the test body and the mock upstream handlers.
#[derive(Clone, Default)]
pub struct CaptureState {
    pub reqs: Arc<Mutex<Vec<Captured>>>,
    pub calls: Arc<AtomicUsize>,
}

impl CaptureState {
    /// Records the request and returns its 1-based arrival index.
    pub fn record(&self, path: &str, headers: HeaderMap, body: &[u8]) -> usize {
        self.reqs.lock().unwrap().push(Captured {
            path: path.to_string(),
            headers,
            body: body.to_vec(),
        });
        self.calls.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn hits(&self, path: &str) -> Vec<Captured> {
        self.reqs
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }
}

pub async fn spawn_test_server(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let base = Url::parse(&format!("http://{}", addr)).expect("valid base url");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    base
}

/// Config pointing both upstreams at `base`, with millisecond retry delays.
pub fn test_config(base: &Url) -> univers_proxy::config::Config {
    let mut cfg = univers_proxy::config::Config::default();
    cfg.univers.base_url = Some(base.join("/univers/v1").expect("univers base"));
    cfg.univers.token_url = Some(base.join("/oauth/token").expect("token url"));
    cfg.univers.client_id = Some("client-id".to_string());
    cfg.univers.client_secret = Some("client-secret".to_string());
    cfg.agrega.base_url = Some(base.join("/agrega").expect("agrega base"));
    cfg.agrega.api_key = Some("agrega-key".to_string());
    cfg.http.timeout_secs = 5.0;
    cfg.http.connect_timeout_secs = 1.0;
    cfg.http.retry_min_delay_ms = 1;
    cfg.http.retry_max_delay_ms = 4;
    cfg
}

pub fn app_for(base: &Url) -> Router {
    let cfg = test_config(base);
    let upstreams =
        univers_proxy::upstream::Upstreams::from_config(&cfg).expect("upstreams from config");
    univers_proxy::server::router::app_router(univers_proxy::server::router::AppState::new(
        upstreams,
    ))
}

pub async fn send(app: &Router, request: Request<Body>) -> (Response<Body>, Value) {
    let resp = app
        .clone()
        .oneshot(request)
        .await
        .expect("request failed");
    let (parts, body) = resp.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .expect("failed to read response body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body was not json")
    };
    (Response::from_parts(parts, Body::empty()), value)
}
