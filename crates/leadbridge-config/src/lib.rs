//! Environment-driven configuration for the leadbridge service.
//!
//! Configuration is assembled exactly once at startup from environment
//! variables (optionally populated from a `.env` file by the binary).
//! Missing client credentials are fatal; every other setting carries a
//! production default.

pub mod error;
pub mod settings;

pub use error::{ConfigError, Result};
pub use settings::{AppConfig, OAuthSettings};
