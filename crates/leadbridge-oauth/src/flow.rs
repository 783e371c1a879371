//! Authorization flow controller.
//!
//! Owns the live state token and the currently held token record, and drives
//! the three HTTP-facing steps: initiate login, handle the callback, and hand
//! the resulting record to the authenticated API client.

use std::sync::Arc;

use chrono::Utc;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{OAuthError, Result};
use crate::oauth::{self, OAuthConfig};
use crate::store::{TokenRecord, TokenStore};

/// Shared handle to the currently held token record.
///
/// Readers see either the old or the new record in full; the whole record is
/// replaced under the write lock, never patched.
pub type SharedTokenRecord = Arc<RwLock<Option<TokenRecord>>>;

/// The authorization flow controller.
///
/// One instance per process, constructed at startup and handed to the HTTP
/// layer by reference. Exactly one state token is live at a time; concurrent
/// independent login flows are not supported.
pub struct AuthFlow {
    config: OAuthConfig,
    store: Arc<dyn TokenStore>,
    state_token: String,
    token: SharedTokenRecord,
    http: reqwest::Client,
}

impl AuthFlow {
    /// Create a new flow controller. Generates the process's state token.
    pub fn new(config: OAuthConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        Ok(Self {
            config,
            store,
            state_token: oauth::generate_state(),
            token: Arc::new(RwLock::new(None)),
            http: oauth::exchange_client()?,
        })
    }

    /// Attempt to load a persisted token at startup.
    ///
    /// Any load failure leaves the flow unauthenticated; the server keeps
    /// serving and `/login` remains reachable.
    pub async fn bootstrap(&self) {
        match self.store.load().await {
            Ok(record) => {
                info!(expires_at = %record.expires_at, "Using saved token");
                let mut guard = self.token.write().await;
                *guard = Some(record);
            }
            Err(e) => {
                info!(reason = %e, "No usable saved token, login required");
            }
        }
    }

    /// The authorization URL for the login redirect, carrying the live state
    /// token. No network call is made here.
    pub fn login_url(&self) -> String {
        oauth::build_authorization_url(&self.config, &self.state_token)
    }

    /// Handle the authorization callback: validate state, exchange the code,
    /// persist the record, install it.
    pub async fn handle_callback(&self, state: &str, code: &str) -> Result<()> {
        // Hard security check; the code value is deliberately kept out of
        // the log line.
        if !constant_time_eq(state, &self.state_token) {
            warn!("Callback rejected: state parameter mismatch");
            return Err(OAuthError::CsrfMismatch);
        }

        let response = oauth::exchange_code(&self.http, &self.config, code).await?;
        let record = TokenRecord::from_response(response, Utc::now());

        // An unpersisted token is not trusted to survive a restart, so a
        // save failure surfaces even though the exchange succeeded and the
        // in-memory record stays untouched.
        self.store.save(&record).await?;

        info!(expires_at = %record.expires_at, "Authorization complete, token persisted");
        let mut guard = self.token.write().await;
        *guard = Some(record);
        Ok(())
    }

    /// Whether a token record is currently held.
    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// The shared record handle the API client binds to.
    pub fn token_handle(&self) -> SharedTokenRecord {
        self.token.clone()
    }

    /// The live state token (exposed for tests and diagnostics).
    pub fn state_token(&self) -> &str {
        &self.state_token
    }
}

impl std::fmt::Debug for AuthFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFlow")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// Compare two strings in constant time.
///
/// The comparison takes the same amount of time regardless of how many
/// characters match.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    if a_bytes.len() == b_bytes.len() {
        a_bytes.ct_eq(b_bytes).into()
    } else {
        // Dummy comparison to keep timing consistent when lengths differ
        let _ = a_bytes.ct_eq(a_bytes);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LoadError, MemoryTokenStore};
    use chrono::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(token_url: String) -> OAuthConfig {
        OAuthConfig::leadconnector(
            "client-123".to_string(),
            "secret-456".to_string(),
            vec!["contacts.readonly".to_string()],
        )
        .with_token_url(token_url)
    }

    fn valid_record() -> TokenRecord {
        TokenRecord {
            access_token: "saved_token".to_string(),
            token_type: "Bearer".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
            refresh_token: None,
            scope: None,
        }
    }

    async fn mock_token_endpoint(server: &MockServer, access_token: &str) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": access_token,
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
        assert!(constant_time_eq("", ""));
    }

    #[tokio::test]
    async fn test_bootstrap_with_saved_token() {
        let store = Arc::new(MemoryTokenStore::with_record(valid_record()));
        let flow = AuthFlow::new(test_config("http://unused".to_string()), store).unwrap();

        flow.bootstrap().await;
        assert!(flow.is_authenticated().await);

        let handle = flow.token_handle();
        let guard = handle.read().await;
        assert_eq!(guard.as_ref().unwrap().access_token, "saved_token");
    }

    #[tokio::test]
    async fn test_bootstrap_without_saved_token() {
        let store = Arc::new(MemoryTokenStore::new());
        let flow = AuthFlow::new(test_config("http://unused".to_string()), store).unwrap();

        flow.bootstrap().await;
        assert!(!flow.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_login_url_carries_state_token() {
        let store = Arc::new(MemoryTokenStore::new());
        let flow = AuthFlow::new(test_config("http://unused".to_string()), store).unwrap();

        let url = flow.login_url();
        assert!(url.contains(&format!("state={}", flow.state_token())));
    }

    #[tokio::test]
    async fn test_callback_state_mismatch_never_exchanges() {
        // Token endpoint with zero expected calls: a CSRF reject must not
        // reach the exchange step.
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        let flow = AuthFlow::new(
            test_config(format!("{}/oauth/token", server.uri())),
            store,
        )
        .unwrap();

        let err = flow.handle_callback("wrong_state", "ABC").await.unwrap_err();
        assert!(matches!(err, OAuthError::CsrfMismatch));
        assert!(!flow.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_callback_success_persists_and_installs() {
        let server = MockServer::start().await;
        mock_token_endpoint(&server, "T1").await;

        let store = Arc::new(MemoryTokenStore::new());
        let flow = AuthFlow::new(
            test_config(format!("{}/oauth/token", server.uri())),
            store.clone(),
        )
        .unwrap();

        let state = flow.state_token().to_string();
        flow.handle_callback(&state, "ABC").await.unwrap();

        assert!(flow.is_authenticated().await);

        // The persisted record matches the exchange response.
        let persisted = store.load().await.unwrap();
        assert_eq!(persisted.access_token, "T1");
        assert_eq!(persisted.token_type, "Bearer");
        assert!(!persisted.is_expired(Utc::now()));

        // The installed record is the freshly persisted one.
        let handle = flow.token_handle();
        assert_eq!(handle.read().await.as_ref().unwrap().access_token, "T1");
    }

    #[tokio::test]
    async fn test_callback_exchange_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        let flow = AuthFlow::new(
            test_config(format!("{}/oauth/token", server.uri())),
            store.clone(),
        )
        .unwrap();

        let state = flow.state_token().to_string();
        let err = flow.handle_callback(&state, "ABC").await.unwrap_err();
        assert!(matches!(err, OAuthError::Exchange(_)));
        assert!(!flow.is_authenticated().await);
        assert!(matches!(store.load().await, Err(LoadError::NotFound)));
    }

    #[tokio::test]
    async fn test_callback_persist_failure_leaves_memory_untouched() {
        let server = MockServer::start().await;
        mock_token_endpoint(&server, "T1").await;

        let store = Arc::new(MemoryTokenStore::failing());
        let flow = AuthFlow::new(
            test_config(format!("{}/oauth/token", server.uri())),
            store,
        )
        .unwrap();

        let state = flow.state_token().to_string();
        let err = flow.handle_callback(&state, "ABC").await.unwrap_err();
        assert!(matches!(err, OAuthError::Persist(_)));
        assert!(!flow.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_new_exchange_replaces_record_wholesale() {
        let server = MockServer::start().await;
        mock_token_endpoint(&server, "T2").await;

        let store = Arc::new(MemoryTokenStore::with_record(valid_record()));
        let flow = AuthFlow::new(
            test_config(format!("{}/oauth/token", server.uri())),
            store,
        )
        .unwrap();
        flow.bootstrap().await;

        let state = flow.state_token().to_string();
        flow.handle_callback(&state, "NEW").await.unwrap();

        let handle = flow.token_handle();
        assert_eq!(handle.read().await.as_ref().unwrap().access_token, "T2");
    }
}
