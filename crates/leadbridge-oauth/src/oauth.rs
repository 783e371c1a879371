//! OAuth 2.0 Authorization Code flow primitives for the LeadConnector CRM.

use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{OAuthError, Result};

/// Timeout applied to the token exchange request. The exchange gates the
/// whole login path, so it must not hang on a stalled upstream.
pub const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// OAuth client configuration for the LeadConnector CRM.
#[derive(Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub authorize_url: String,
    pub token_url: String,
}

impl OAuthConfig {
    /// Create OAuth config for the production LeadConnector endpoints.
    pub fn leadconnector(client_id: String, client_secret: String, scopes: Vec<String>) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri: "http://localhost:8080/callback".to_string(),
            scopes,
            authorize_url: "https://marketplace.gohighlevel.com/oauth/chooselocation".to_string(),
            token_url: "https://services.leadconnectorhq.com/oauth/token".to_string(),
        }
    }

    /// Set the redirect URI. Must exactly match the value registered with
    /// the authorization server.
    pub fn with_redirect_uri(mut self, uri: String) -> Self {
        self.redirect_uri = uri;
        self
    }

    /// Set the authorization endpoint URL.
    pub fn with_authorize_url(mut self, url: String) -> Self {
        self.authorize_url = url;
        self
    }

    /// Set the token endpoint URL.
    pub fn with_token_url(mut self, url: String) -> Self {
        self.token_url = url;
        self
    }

    /// The space-joined scope string as the authorization endpoint expects it.
    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }
}

// The client secret must never reach logs, so Debug is written by hand.
impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .finish()
    }
}

/// Generate a random state string for CSRF protection.
///
/// Draws 16 bytes from the OS-seeded CSPRNG. `fill_bytes` aborts the process
/// if the random source is unavailable; a predictable state token is never
/// produced.
pub fn generate_state() -> String {
    let mut state_bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut state_bytes);
    URL_SAFE_NO_PAD.encode(state_bytes)
}

/// Build the authorization URL for the login redirect.
pub fn build_authorization_url(config: &OAuthConfig, state: &str) -> String {
    let scope = config.scope();
    let params = [
        ("response_type", "code"),
        ("redirect_uri", &config.redirect_uri),
        ("client_id", &config.client_id),
        ("scope", &scope),
        ("state", state),
    ];

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", config.authorize_url, query)
}

/// Token document returned by the token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Build the HTTP client used for the token exchange.
pub fn exchange_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(EXCHANGE_TIMEOUT)
        .build()
        .map_err(|e| OAuthError::Config(format!("Failed to build exchange client: {}", e)))
}

/// Exchange an authorization code for a token.
///
/// A single form-encoded POST per the Authorization Code grant. The code is
/// single-use upstream, so a failed exchange is never retried with the same
/// value.
pub async fn exchange_code(
    http: &reqwest::Client,
    config: &OAuthConfig,
    code: &str,
) -> Result<TokenResponse> {
    let params = [
        ("grant_type", "authorization_code"),
        ("client_id", &config.client_id),
        ("client_secret", &config.client_secret),
        ("code", code),
        ("redirect_uri", &config.redirect_uri),
    ];

    let response = http
        .post(&config.token_url)
        .form(&params)
        .send()
        .await
        .map_err(|e| OAuthError::Network(format!("Token exchange request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(OAuthError::Exchange(format!(
            "Token endpoint returned {}: {}",
            status, body
        )));
    }

    response
        .json()
        .await
        .map_err(|e| OAuthError::Exchange(format!("Failed to parse token response: {}", e)))
}
