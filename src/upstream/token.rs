use chrono::{DateTime, TimeDelta, Utc};
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use super::http::HttpTransport;
use super::retry::{RetryPolicy, transport_only, with_retry};
use crate::config::UniversResolvedConfig;
use crate::correlation::{CORRELATION_HEADER, CorrelationId};
use crate::error::{ProxyError, UpstreamError};

/// A token is not served once it has this little life left.
const SAFETY_MARGIN_SECS: i64 = 20;

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: f64 = 3600.0;

/// Upper bound on the lifetime honored from the token endpoint (one year).
const MAX_EXPIRES_IN_SECS: f64 = 365.0 * 24.0 * 3600.0;

/// OAuth2 access token with its absolute expiry. Replaced wholesale on refresh.
#[derive(Clone)]
pub struct Token {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl Token {
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Usable at `now`: more than the safety margin left before expiry.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now > TimeDelta::seconds(SAFETY_MARGIN_SECS)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// OAuth2 client-credentials grant parameters.
#[derive(Clone)]
pub struct ClientCredentials {
    pub token_url: Url,
    pub client_id: String,
    pub client_secret: String,
}

impl From<&UniversResolvedConfig> for ClientCredentials {
    fn from(cfg: &UniversResolvedConfig) -> Self {
        Self {
            token_url: cfg.token_url.clone(),
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
        }
    }
}

/// Single-slot bearer token cache shared by every configuration request.
///
/// Readers take a snapshot of the slot under a short read lock that is never held across an
/// await. A miss falls through to `refresh_lock`, where the slot is checked again before the
/// token endpoint is called, so concurrent misses produce a single fetch. A failed fetch
/// leaves the slot untouched.
pub struct TokenCache {
    transport: HttpTransport,
    credentials: ClientCredentials,
    retry: RetryPolicy,
    slot: RwLock<Option<Arc<Token>>>,
    refresh_lock: Mutex<()>,
}

impl TokenCache {
    pub fn new(transport: HttpTransport, credentials: ClientCredentials, retry: RetryPolicy) -> Self {
        Self {
            transport,
            credentials,
            retry,
            slot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Returns a bearer token valid for at least the safety margin, fetching one if needed.
    pub async fn get(&self, correlation_id: &CorrelationId) -> Result<String, ProxyError> {
        if let Some(token) = self.fresh_token() {
            return Ok(token.access_token.clone());
        }

        let _guard = self.refresh_lock.lock().await;

        if let Some(token) = self.fresh_token() {
            debug!(
                correlation_id = %correlation_id,
                "OAuth2 token refreshed by a concurrent caller"
            );
            return Ok(token.access_token.clone());
        }

        let token = Arc::new(self.fetch_token(correlation_id).await?);
        info!(
            correlation_id = %correlation_id,
            expires_at = %token.expires_at,
            "OAuth2 token refreshed"
        );

        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&token));
        Ok(token.access_token.clone())
    }

    /// Current token, fresh or not.
    pub fn cached(&self) -> Option<Arc<Token>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn fresh_token(&self) -> Option<Arc<Token>> {
        let now = Utc::now();
        self.cached().filter(|token| token.is_fresh_at(now))
    }

    pub(crate) fn build_token_request(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<reqwest::Request, reqwest::Error> {
        let creds = &self.credentials;
        self.transport
            .client()
            .post(creds.token_url.clone())
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .header(CORRELATION_HEADER, correlation_id.as_str())
            .form(&[("grant_type", "client_credentials")])
            .build()
    }

    async fn fetch_token(&self, correlation_id: &CorrelationId) -> Result<Token, ProxyError> {
        let resp = with_retry(
            &self.retry,
            "oauth_token",
            correlation_id,
            || async move {
                let req = self.build_token_request(correlation_id)?;
                Ok::<_, ProxyError>(self.transport.execute(req).await?)
            },
            transport_only,
        )
        .await?;

        let payload = resp.json_or_raw();

        if resp.is_error() {
            warn!(
                correlation_id = %correlation_id,
                status = %resp.status,
                body = %resp.preview(),
                "OAuth2 token endpoint rejected the request"
            );
            return Err(UpstreamError::new(
                resp.status,
                format!("failed to obtain OAuth2 token: {}", resp.text()),
                payload,
            )
            .into());
        }

        token_from_payload(payload, Utc::now()).map_err(ProxyError::from)
    }
}

fn token_from_payload(payload: Value, now: DateTime<Utc>) -> Result<Token, UpstreamError> {
    let Some(access_token) = payload
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
    else {
        return Err(UpstreamError::new(
            StatusCode::BAD_GATEWAY,
            "invalid token response: access_token missing",
            payload,
        ));
    };

    let expires_in = match payload.get("expires_in") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .unwrap_or(DEFAULT_EXPIRES_IN_SECS);

    #[allow(clippy::cast_possible_truncation)]
    let expires_at = Some(expires_in)
        .filter(|secs| secs.is_finite())
        .map(|secs| secs.clamp(0.0, MAX_EXPIRES_IN_SECS))
        .and_then(|secs| TimeDelta::try_milliseconds((secs * 1000.0) as i64))
        .and_then(|lifetime| now.checked_add_signed(lifetime));

    match expires_at {
        Some(expires_at) => Ok(Token::new(access_token, expires_at)),
        None => Err(UpstreamError::new(
            StatusCode::BAD_GATEWAY,
            "invalid token response: expires_in out of range",
            payload,
        )),
    }
}
