//! Durable persistence for the OAuth token record.
//!
//! A single JSON document holds the whole record; every successful exchange
//! replaces it wholesale. Expiry is enforced at load time so callers never
//! see a stale token.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::oauth::TokenResponse;

/// Default token file name, relative to the working directory.
pub const TOKEN_FILE: &str = "token.json";

/// Fallback token lifetime when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

// ============================================================================
// TokenRecord
// ============================================================================

/// The persisted OAuth token record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    pub token_type: String,
    /// Absolute expiry timestamp (UTC).
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<Vec<String>>,
}

impl TokenRecord {
    /// Build a record from a token endpoint response, anchoring the relative
    /// `expires_in` to an absolute timestamp.
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        let lifetime = response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        Self {
            access_token: response.access_token,
            token_type: if response.token_type.is_empty() {
                "Bearer".to_string()
            } else {
                response.token_type
            },
            expires_at: now + Duration::seconds(lifetime),
            refresh_token: response.refresh_token,
            scope: response
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect()),
        }
    }

    /// A record whose expiry is at or before `now` is unusable.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors saving a token record.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure (disk full, permission denied).
    #[error("failed to write token file: {0}")]
    Io(#[from] std::io::Error),

    /// The record could not be serialized.
    #[error("failed to serialize token record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors loading a token record. All three fold to "login required" at the
/// call site but stay distinguishable in logs.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// No record has been persisted.
    #[error("no token record found")]
    NotFound,

    /// The persisted document could not be deserialized.
    #[error("token record is corrupt: {0}")]
    Corrupt(String),

    /// The persisted record's expiry is not in the future.
    #[error("token record expired at {0}")]
    Expired(DateTime<Utc>),
}

// ============================================================================
// TokenStore Trait
// ============================================================================

/// Durable storage for a single token record.
#[async_trait]
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Persist the record, replacing any prior record in full.
    async fn save(&self, record: &TokenRecord) -> Result<(), StoreError>;

    /// Load the persisted record, enforcing expiry.
    async fn load(&self) -> Result<TokenRecord, LoadError>;
}

// ============================================================================
// FileTokenStore
// ============================================================================

/// File-backed token store for production use.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store at the given path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Get the token file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn save(&self, record: &TokenRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(record)?;

        // Write a sibling temp file and rename over the destination so a
        // concurrent reader never observes a half-written record.
        let temp = self.temp_path();
        std::fs::write(&temp, json)?;
        set_owner_only_permissions(&temp)?;
        std::fs::rename(&temp, &self.path)?;

        tracing::info!(path = %self.path.display(), "Token record saved");
        Ok(())
    }

    async fn load(&self) -> Result<TokenRecord, LoadError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::NotFound);
            }
            Err(e) => return Err(LoadError::Corrupt(e.to_string())),
        };

        let record: TokenRecord =
            serde_json::from_str(&content).map_err(|e| LoadError::Corrupt(e.to_string()))?;

        if record.is_expired(Utc::now()) {
            return Err(LoadError::Expired(record.expires_at));
        }

        Ok(record)
    }
}

/// Restrict the token file to owner read/write on Unix.
#[cfg(unix)]
fn set_owner_only_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn set_owner_only_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

// ============================================================================
// MemoryTokenStore (for testing)
// ============================================================================

/// In-memory token store for tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    record: RwLock<Option<TokenRecord>>,
    fail_saves: bool,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `save` always fails, for exercising persistence errors.
    pub fn failing() -> Self {
        Self {
            record: RwLock::new(None),
            fail_saves: true,
        }
    }

    pub fn with_record(record: TokenRecord) -> Self {
        Self {
            record: RwLock::new(Some(record)),
            fail_saves: false,
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save(&self, record: &TokenRecord) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Io(std::io::Error::other("simulated disk failure")));
        }
        let mut guard = self.record.write().await;
        *guard = Some(record.clone());
        Ok(())
    }

    async fn load(&self) -> Result<TokenRecord, LoadError> {
        let guard = self.record.read().await;
        let record = guard.clone().ok_or(LoadError::NotFound)?;
        if record.is_expired(Utc::now()) {
            return Err(LoadError::Expired(record.expires_at));
        }
        Ok(record)
    }
}
