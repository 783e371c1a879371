//! Server configuration.

use std::net::SocketAddr;

/// Default upstream API base for the `/me` passthrough.
pub const DEFAULT_API_BASE_URL: &str = "https://api.gohighlevel.com";

/// Default upstream base for the contact search passthrough.
pub const DEFAULT_SERVICES_BASE_URL: &str = "https://services.leadconnectorhq.com";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Upstream API base for the `/me` passthrough.
    pub api_base_url: String,

    /// Upstream base for the contact search passthrough.
    pub services_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".parse().unwrap(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            services_base_url: DEFAULT_SERVICES_BASE_URL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Create a new server config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the upstream API base URL.
    pub fn with_api_base_url(mut self, url: String) -> Self {
        self.api_base_url = url;
        self
    }

    /// Set the upstream services base URL.
    pub fn with_services_base_url(mut self, url: String) -> Self {
        self.services_base_url = url;
        self
    }
}
