//! Authenticated client for the upstream CRM API.
//!
//! Attaches the Bearer credential and the API-mandated headers from the
//! currently held token record. Refuses to send while unauthenticated.

use reqwest::{Client, Method, header};
use tracing::warn;

use crate::error::{OAuthError, Result};
use crate::flow::SharedTokenRecord;

/// API version header required by the CRM.
pub const API_VERSION_HEADER: &str = "Version";

/// API version the passthrough endpoints were written against.
pub const API_VERSION: &str = "2021-07-28";

/// Response from the upstream API, passed through opaquely.
///
/// 4xx/5xx remote statuses are preserved here rather than mapped to a local
/// error; only transport failures error out.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    /// Whether the remote status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Client for authenticated requests to the CRM API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    token: SharedTokenRecord,
}

impl ApiClient {
    /// Create a client bound to the flow controller's shared token record.
    pub fn new(token: SharedTokenRecord) -> Self {
        Self {
            client: Client::new(),
            token,
        }
    }

    /// Issue an authenticated request.
    ///
    /// Fails with [`OAuthError::Unauthenticated`] before any network I/O if
    /// no token record is held. No retry, no refresh.
    pub async fn authorized_request(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<UpstreamResponse> {
        let bearer = {
            let guard = self.token.read().await;
            match guard.as_ref() {
                Some(record) => format!("Bearer {}", record.access_token),
                None => return Err(OAuthError::Unauthenticated),
            }
        };

        let mut req = self
            .client
            .request(method, url)
            .header(header::AUTHORIZATION, bearer)
            .header(API_VERSION_HEADER, API_VERSION)
            .header(header::ACCEPT, "application/json");

        if let Some(body) = body {
            req = req.json(&body);
        }

        let response = req
            .send()
            .await
            .map_err(|e| OAuthError::Network(format!("Upstream request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| OAuthError::Network(format!("Failed to read upstream response: {}", e)))?;

        if !(200..300).contains(&status) {
            warn!(status, "Upstream API returned an error status");
        }

        Ok(UpstreamResponse { status, body })
    }
}
