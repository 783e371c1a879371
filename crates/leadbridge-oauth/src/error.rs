//! Error types for the OAuth flow.

use crate::store::StoreError;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, OAuthError>;

/// Errors that can occur in the OAuth flow.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Callback state does not match the live state token.
    #[error("State parameter does not match the expected value")]
    CsrfMismatch,

    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(String),

    /// The token endpoint rejected the exchange.
    #[error("Token exchange failed: {0}")]
    Exchange(String),

    /// The token could not be persisted after a successful exchange.
    #[error("Token persistence failed: {0}")]
    Persist(#[from] StoreError),

    /// No token is held; the request was not sent.
    #[error("Not authenticated: login required")]
    Unauthenticated,
}

impl From<reqwest::Error> for OAuthError {
    fn from(e: reqwest::Error) -> Self {
        OAuthError::Network(e.to_string())
    }
}
