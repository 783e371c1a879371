//! OAuth 2.0 Authorization Code flow for the LeadConnector CRM.
//!
//! Drives the browser login round trip, exchanges the authorization code for
//! a token, persists that token across restarts, and issues authenticated
//! requests to the CRM API.
//!
//! # Components
//!
//! - [`oauth`] — client config, CSRF state token, authorization URL, code exchange
//! - [`store`] — token record persistence with expiry enforced on load
//! - [`flow`] — the flow controller owning the live state token and held record
//! - [`client`] — authenticated request issuer for the upstream API

pub mod client;
pub mod error;
pub mod flow;
pub mod oauth;
pub mod store;

pub use client::{ApiClient, UpstreamResponse};
pub use error::{OAuthError, Result};
pub use flow::{AuthFlow, SharedTokenRecord};
pub use oauth::{OAuthConfig, TokenResponse, build_authorization_url, generate_state};
pub use store::{FileTokenStore, LoadError, MemoryTokenStore, StoreError, TokenRecord, TokenStore};
