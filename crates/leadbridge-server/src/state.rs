//! Application state shared across handlers.

use std::sync::Arc;

use leadbridge_oauth::{ApiClient, AuthFlow};

use crate::config::ServerConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The authorization flow controller.
    pub flow: Arc<AuthFlow>,

    /// Authenticated client for upstream passthroughs, bound to the flow's
    /// shared token record.
    pub api: Arc<ApiClient>,

    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(flow: AuthFlow, config: ServerConfig) -> Self {
        let api = ApiClient::new(flow.token_handle());
        Self {
            flow: Arc::new(flow),
            api: Arc::new(api),
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadbridge_oauth::{MemoryTokenStore, OAuthConfig};

    fn test_flow() -> AuthFlow {
        let config = OAuthConfig::leadconnector(
            "client-123".to_string(),
            "secret-456".to_string(),
            vec!["contacts.readonly".to_string()],
        );
        AuthFlow::new(config, Arc::new(MemoryTokenStore::new())).unwrap()
    }

    #[tokio::test]
    async fn test_state_starts_unauthenticated() {
        let state = AppState::new(test_flow(), ServerConfig::default());
        assert!(!state.flow.is_authenticated().await);
    }
}
