use crate::correlation::{CORRELATION_HEADER, CorrelationId};
use crate::server::routes::{agrega, customize, health};
use crate::upstream::Upstreams;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, StatusCode, Version, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
};
use std::time::Instant;
use tracing::{error, info, warn};

fn format_http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

#[derive(Clone)]
pub struct AppState {
    pub upstreams: Upstreams,
}

impl AppState {
    pub fn new(upstreams: Upstreams) -> Self {
        Self { upstreams }
    }
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Resolves the request's correlation id, hands it to handlers through request extensions,
/// echoes it on the response and writes one access-log line.
async fn correlation_access_log(mut req: Request, next: Next) -> Response {
    // Capture request metadata before moving `req` into the handler stack.
    let method = req.method().clone();
    let uri = req.uri().clone();
    let version = req.version();

    let correlation_id = CorrelationId::from_headers_or_generate(req.headers());
    req.extensions_mut().insert(correlation_id.clone());

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(correlation_id.as_str()) {
        resp.headers_mut().insert(CORRELATION_HEADER, value);
    }

    let status = resp.status();
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let path = uri.path();
    let protocol = format_http_version(version);

    if status.is_server_error() {
        error!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            correlation_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else if status.is_client_error() {
        warn!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            correlation_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else {
        info!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            correlation_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    }

    resp
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(customize::router())
        .merge(agrega::router())
        .fallback(not_found_handler)
        .with_state(state)
        .layer(middleware::from_fn(correlation_access_log))
}
