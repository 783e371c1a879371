//! Application settings assembled from the environment.
//!
//! # Environment Variables
//!
//! - `OAUTH2_CLIENT_ID` — OAuth client identifier (required)
//! - `OAUTH2_CLIENT_SECRET` — OAuth client secret (required, never logged)
//! - `OAUTH2_SCOPES` — comma-separated scope list
//! - `OAUTH2_BASE_URL` — authorization page base URL
//! - `OAUTH2_TOKEN_URL` — token endpoint URL
//! - `OAUTH2_REDIRECT_URL` — redirect URI registered with the authorization server
//! - `LEADBRIDGE_BIND_ADDR` — server bind address
//! - `LEADBRIDGE_TOKEN_FILE` — token record location
//! - `LEADBRIDGE_API_BASE_URL` / `LEADBRIDGE_SERVICES_BASE_URL` — upstream API bases

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Default authorization page base (the location chooser).
pub const DEFAULT_AUTHORIZE_BASE_URL: &str = "https://marketplace.gohighlevel.com";

/// Default token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://services.leadconnectorhq.com/oauth/token";

/// Default redirect URI. Must match the value registered for the client.
pub const DEFAULT_REDIRECT_URL: &str = "http://localhost:8080/callback";

/// Default server bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Default token record location, relative to the working directory.
pub const DEFAULT_TOKEN_FILE: &str = "token.json";

/// Default upstream API base for the `/me` passthrough.
pub const DEFAULT_API_BASE_URL: &str = "https://api.gohighlevel.com";

/// Default upstream base for the contact search passthrough.
pub const DEFAULT_SERVICES_BASE_URL: &str = "https://services.leadconnectorhq.com";

/// OAuth client settings.
#[derive(Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
    pub redirect_url: String,
    /// Full authorization page URL (base + chooser path).
    pub authorize_url: String,
    pub token_url: String,
}

// Keeps the client secret out of debug logs.
impl std::fmt::Debug for OAuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scopes", &self.scopes)
            .field("redirect_url", &self.redirect_url)
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .finish()
    }
}

/// Complete application configuration, assembled once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub oauth: OAuthSettings,
    pub bind_address: SocketAddr,
    pub token_file: PathBuf,
    pub api_base_url: String,
    pub services_base_url: String,
}

impl AppConfig {
    /// Assemble configuration from the process environment.
    ///
    /// Missing client credentials are fatal; everything else falls back to
    /// the production defaults.
    pub fn from_env() -> Result<Self> {
        let client_id = required_env("OAUTH2_CLIENT_ID")?;
        let client_secret = required_env("OAUTH2_CLIENT_SECRET")?;

        let scopes = optional_env("OAUTH2_SCOPES")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let authorize_base = optional_env("OAUTH2_BASE_URL")
            .unwrap_or_else(|| DEFAULT_AUTHORIZE_BASE_URL.to_string());
        let authorize_url = format!(
            "{}/oauth/chooselocation",
            authorize_base.trim_end_matches('/')
        );

        let bind_raw =
            optional_env("LEADBRIDGE_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_address: SocketAddr =
            bind_raw.parse().map_err(|e| ConfigError::InvalidEnv {
                name: "LEADBRIDGE_BIND_ADDR".to_string(),
                reason: format!("{}", e),
            })?;

        Ok(Self {
            oauth: OAuthSettings {
                client_id,
                client_secret,
                scopes,
                redirect_url: optional_env("OAUTH2_REDIRECT_URL")
                    .unwrap_or_else(|| DEFAULT_REDIRECT_URL.to_string()),
                authorize_url,
                token_url: optional_env("OAUTH2_TOKEN_URL")
                    .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            },
            bind_address,
            token_file: optional_env("LEADBRIDGE_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE)),
            api_base_url: optional_env("LEADBRIDGE_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            services_base_url: optional_env("LEADBRIDGE_SERVICES_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SERVICES_BASE_URL.to_string()),
        })
    }
}

fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv {
            name: name.to_string(),
        }),
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
