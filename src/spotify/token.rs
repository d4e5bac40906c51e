use async_trait::async_trait;
use base64::Engine;
use parking_lot::Mutex;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::spotify::models::{AuthHeader, TokenResponse};

/// Anything that can exchange client credentials for an access token.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn request_token(&self) -> Result<TokenResponse>;
}

/// Client-credentials exchange routed through a CORS proxy that forwards
/// the request to the Spotify accounts service.
pub struct ProxyTokenSource {
    http_client: Client,
    proxy_url: String,
    auth_url: String,
    client_id: String,
    client_secret: String,
}

impl ProxyTokenSource {
    pub fn new(http_client: Client, config: &Config) -> Self {
        Self {
            http_client,
            proxy_url: config.token_proxy_url.clone(),
            auth_url: config.spotify_auth_url.clone(),
            client_id: config.spotify_client_id.clone(),
            client_secret: config.spotify_client_secret.clone(),
        }
    }

    fn basic_auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.client_id, self.client_secret);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        )
    }
}

#[async_trait]
impl TokenSource for ProxyTokenSource {
    async fn request_token(&self) -> Result<TokenResponse> {
        let body = json!({
            "reqUrl": self.auth_url,
            "params": { "grant_type": "client_credentials" },
            "proxyHeaders": { "Authorization": self.basic_auth_header() },
        });

        let response = self
            .http_client
            .post(&self.proxy_url)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "Token request failed ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Failed to parse token response: {}", e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthorized,
    Authorized,
    /// The last request failed with an error a token refresh cannot fix.
    Fatal,
}

/// What a caller should do after an API call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    /// A fresh token is in place; redo the request once.
    Retry,
    /// Give up. Carries the HTTP status when there was one.
    Fatal(Option<u16>),
}

#[derive(Debug)]
struct TokenState {
    header: Option<AuthHeader>,
    state: AuthState,
}

/// Owns the Spotify auth header and refreshes it when the API rejects it.
///
/// There is no expiry tracking: a 401 is the only signal that the token
/// needs replacing.
pub struct TokenManager<S = ProxyTokenSource> {
    source: S,
    inner: Mutex<TokenState>,
}

impl<S: TokenSource> TokenManager<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            inner: Mutex::new(TokenState {
                header: None,
                state: AuthState::Unauthorized,
            }),
        }
    }

    pub fn current_header(&self) -> Option<AuthHeader> {
        self.inner.lock().header.clone()
    }

    pub fn state(&self) -> AuthState {
        self.inner.lock().state
    }

    pub async fn ensure_authorized(&self) -> Result<AuthHeader> {
        {
            let mut inner = self.inner.lock();
            if let Some(header) = inner.header.clone() {
                inner.state = AuthState::Authorized;
                return Ok(header);
            }
        }

        self.acquire().await
    }

    pub async fn handle_auth_error(&self, err: &AppError) -> Result<AuthDecision> {
        match err.status() {
            Some(401) => {
                warn!("Spotify rejected the access token, requesting a new one");
                self.inner.lock().state = AuthState::Unauthorized;
                self.acquire().await?;
                Ok(AuthDecision::Retry)
            }
            Some(status) => {
                warn!("Spotify API HTTP error: {}", status);
                self.inner.lock().state = AuthState::Fatal;
                Ok(AuthDecision::Fatal(Some(status)))
            }
            None => {
                warn!("Error in handling of Spotify response: {}", err);
                self.inner.lock().state = AuthState::Fatal;
                Ok(AuthDecision::Fatal(None))
            }
        }
    }

    async fn acquire(&self) -> Result<AuthHeader> {
        debug!("Requesting Spotify client-credentials token");
        let header = AuthHeader::from(self.source.request_token().await?);

        let mut inner = self.inner.lock();
        inner.header = Some(header.clone());
        inner.state = AuthState::Authorized;
        info!("Authorized with Spotify ({} token)", header.scheme);

        Ok(header)
    }
}
