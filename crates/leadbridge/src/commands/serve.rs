//! Serve command - launches the leadbridge server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::info;

use leadbridge_config::AppConfig;
use leadbridge_oauth::{AuthFlow, FileTokenStore, OAuthConfig};
use leadbridge_server::{Server, ServerConfig};

use super::Context;

/// Arguments for the serve command.
///
/// CLI arguments override environment values.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides LEADBRIDGE_BIND_ADDR)
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,
}

pub async fn run(args: ServeArgs, _ctx: &Context) -> Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let oauth = OAuthConfig::leadconnector(
        config.oauth.client_id.clone(),
        config.oauth.client_secret.clone(),
        config.oauth.scopes.clone(),
    )
    .with_redirect_uri(config.oauth.redirect_url.clone())
    .with_authorize_url(config.oauth.authorize_url.clone())
    .with_token_url(config.oauth.token_url.clone());

    let store = Arc::new(FileTokenStore::new(config.token_file.clone()));
    let flow = AuthFlow::new(oauth, store)?;
    flow.bootstrap().await;

    let bind_address = args.bind.unwrap_or(config.bind_address);
    let server_config = ServerConfig::new()
        .with_bind_address(bind_address)
        .with_api_base_url(config.api_base_url.clone())
        .with_services_base_url(config.services_base_url.clone());

    info!(addr = %bind_address, "Starting leadbridge");
    let server = Server::new(flow, server_config);
    server.run().await?;

    Ok(())
}
