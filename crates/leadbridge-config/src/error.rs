//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while assembling configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing or empty.
    #[error("missing required environment variable '{name}'")]
    MissingEnv { name: String },

    /// An environment variable is present but unusable.
    #[error("invalid value for environment variable '{name}': {reason}")]
    InvalidEnv { name: String, reason: String },
}
