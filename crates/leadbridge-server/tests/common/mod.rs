//! Common test utilities for integration tests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, redirect};
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use leadbridge_oauth::{AuthFlow, FileTokenStore, OAuthConfig};
use leadbridge_server::{Server, ServerConfig};

/// A test server that runs in the background.
///
/// The token endpoint and both upstream API bases point at the given mock
/// server URI, so a single wiremock instance can play the authorization
/// server and the CRM.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// HTTP client configured for this server (redirects are not followed,
    /// so `/login` responses can be inspected).
    pub client: Client,
    /// Path of the persisted token record.
    pub token_path: PathBuf,
    /// The live state token of the server's flow controller.
    pub state_token: String,
    /// Handle to the server task.
    _handle: JoinHandle<()>,
    /// Temporary directory for the token file, when owned by this server.
    _temp_dir: Option<TempDir>,
}

impl TestServer {
    /// Start a new test server with a fresh token file.
    pub async fn start(upstream: &str) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let token_path = temp_dir.path().join("token.json");
        Self::start_inner(upstream, token_path, Some(temp_dir)).await
    }

    /// Start a test server against an existing token file (restart scenario).
    pub async fn start_with_token_file(upstream: &str, token_path: PathBuf) -> Result<Self> {
        Self::start_inner(upstream, token_path, None).await
    }

    async fn start_inner(
        upstream: &str,
        token_path: PathBuf,
        temp_dir: Option<TempDir>,
    ) -> Result<Self> {
        let addr = find_available_port().await?;

        let oauth = OAuthConfig::leadconnector(
            "client-123".to_string(),
            "secret-456".to_string(),
            vec!["contacts.readonly".to_string()],
        )
        .with_token_url(format!("{}/oauth/token", upstream))
        .with_authorize_url(format!("{}/oauth/chooselocation", upstream));

        let store = Arc::new(FileTokenStore::new(token_path.clone()));
        let flow = AuthFlow::new(oauth, store)?;
        flow.bootstrap().await;
        let state_token = flow.state_token().to_string();

        let config = ServerConfig::new()
            .with_bind_address(addr)
            .with_api_base_url(upstream.to_string())
            .with_services_base_url(upstream.to_string());

        let server = Server::new(flow, config);
        let handle = tokio::spawn(async move {
            let _ = server.run_on(addr).await;
        });

        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()?;
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            client,
            token_path,
            state_token,
            _handle: handle,
            _temp_dir: temp_dir,
        })
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get a request builder for a path on this server.
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(format!("{}{}", self.base_url(), path))
    }
}

/// Find an available port for the test server.
async fn find_available_port() -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}
