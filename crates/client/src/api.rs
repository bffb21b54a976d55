//! REST client for the Whaileys session endpoints.
//!
//! Every call is authenticated with the configured bearer token and every
//! response body is the `{success, data, error}` envelope described in
//! [`crate::types::ApiEnvelope`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::types::{ApiEnvelope, QrCodePayload, SessionRecord};

/// Public Whaileys deployment used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "https://whaileysapi.exisistemas.com.br";

const DEFAULT_TIMEOUT_SECS: u64 = 15;

const CREATE_FAILED: &str = "Erro ao criar sessão";
const DELETE_FAILED: &str = "Falha ao deletar sessão";
const REQUEST_REJECTED: &str = "Requisição rejeitada pela API";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Connection settings for [`WhaileysApi`].
#[derive(Debug, Clone)]
pub struct WhaileysConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl WhaileysConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the bearer token. Blank tokens are treated as absent.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for WhaileysConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the external session API.
///
/// `Display` is the text shown to the operator, so `Api` and `Rejected`
/// render the upstream message verbatim.
#[derive(Debug, thiserror::Error)]
pub enum WhaileysApiError {
    /// Network, DNS, TLS, timeout or body decoding failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx status. `message` is the body's `message`/`error` field or
    /// `API Error: {status}` when the body carries neither.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// 2xx response whose envelope reported failure or lacked `data`.
    #[error("{0}")]
    Rejected(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

// ---------------------------------------------------------------------------
// Trait seam
// ---------------------------------------------------------------------------

/// Operations the dashboard needs from the session service.
#[async_trait]
pub trait SessionApi: Send + Sync {
    async fn list_sessions(&self) -> Result<Vec<SessionRecord>, WhaileysApiError>;

    /// `Ok(None)` when the service does not know the session.
    async fn get_session(&self, session_id: &str)
        -> Result<Option<SessionRecord>, WhaileysApiError>;

    /// Fetch the pairing QR image from the dedicated endpoint.
    async fn qr_code(&self, session_id: &str) -> Result<Option<String>, WhaileysApiError>;

    async fn create_session(&self, session_id: &str) -> Result<SessionRecord, WhaileysApiError>;

    async fn delete_session(&self, session_id: &str) -> Result<(), WhaileysApiError>;

    async fn health(&self) -> Result<(), WhaileysApiError>;
}

// ---------------------------------------------------------------------------
// reqwest implementation
// ---------------------------------------------------------------------------

/// HTTP client for one Whaileys deployment.
#[derive(Debug, Clone)]
pub struct WhaileysApi {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl WhaileysApi {
    pub fn new(config: WhaileysConfig) -> Result<Self, WhaileysApiError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| WhaileysApiError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(WhaileysApiError::InvalidUrl(config.base_url));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: config.token,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, WhaileysApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| WhaileysApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // ---- private helpers ----

    /// Map a non-2xx response to [`WhaileysApiError::Api`].
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, WhaileysApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body)
            .ok()
            .and_then(|env| env.message.or(env.error))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("API Error: {}", status.as_u16()));

        Err(WhaileysApiError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Decode a successful envelope, rejecting an explicit `success: false`.
    async fn parse_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<ApiEnvelope<T>, WhaileysApiError> {
        let response = Self::ensure_success(response).await?;
        let envelope = response.json::<ApiEnvelope<T>>().await?;
        if envelope.is_rejected() {
            let reason = envelope.reason().unwrap_or(REQUEST_REJECTED).to_string();
            return Err(WhaileysApiError::Rejected(reason));
        }
        Ok(envelope)
    }
}

#[async_trait]
impl SessionApi for WhaileysApi {
    async fn list_sessions(&self) -> Result<Vec<SessionRecord>, WhaileysApiError> {
        let url = self.endpoint(&["api", "sessions"])?;
        let response = self.request(Method::GET, url).send().await?;
        let envelope = Self::parse_envelope::<Vec<SessionRecord>>(response).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn get_session(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionRecord>, WhaileysApiError> {
        let url = self.endpoint(&["api", "sessions", session_id])?;
        let response = self.request(Method::GET, url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let envelope = Self::parse_envelope::<SessionRecord>(response).await?;
        Ok(envelope.data)
    }

    async fn qr_code(&self, session_id: &str) -> Result<Option<String>, WhaileysApiError> {
        let url = self.endpoint(&["api", "sessions", session_id, "qrcode"])?;
        let response = self.request(Method::GET, url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let envelope = Self::parse_envelope::<QrCodePayload>(response).await?;
        Ok(envelope.data.and_then(|payload| payload.qr_code))
    }

    async fn create_session(&self, session_id: &str) -> Result<SessionRecord, WhaileysApiError> {
        let url = self.endpoint(&["api", "sessions"])?;
        let body = serde_json::json!({ "sessionId": session_id });
        let response = self.request(Method::POST, url).json(&body).send().await?;

        let response = Self::ensure_success(response).await?;
        let envelope = response.json::<ApiEnvelope<SessionRecord>>().await?;
        let rejected = envelope.is_rejected();
        let reason = envelope.reason().unwrap_or(CREATE_FAILED).to_string();
        match envelope.data {
            Some(record) if !rejected => {
                tracing::debug!(session_id, "Session created upstream");
                Ok(record)
            }
            _ => Err(WhaileysApiError::Rejected(reason)),
        }
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), WhaileysApiError> {
        let url = self.endpoint(&["api", "sessions", session_id])?;
        let response = self.request(Method::DELETE, url).send().await?;
        let response = Self::ensure_success(response).await?;

        // Some deployments answer 204 with no body.
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(());
        }
        match serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body) {
            Ok(envelope) if envelope.is_rejected() => Err(WhaileysApiError::Rejected(
                envelope.reason().unwrap_or(DELETE_FAILED).to_string(),
            )),
            _ => {
                tracing::debug!(session_id, "Session deleted upstream");
                Ok(())
            }
        }
    }

    async fn health(&self) -> Result<(), WhaileysApiError> {
        let url = self.endpoint(&["health"])?;
        let response = self.request(Method::GET, url).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
