//! Credential cache for the remote API
//!
//! A local file keyed by API name holds the bearer token between runs.
//! The OAuth exchange itself happens outside this crate; we only load,
//! store, and expire what the bootstrap hands us.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// API name the cache file is keyed by.
pub const API_NAME: &str = "tagmanager";

/// A cached credential as written by the auth bootstrap.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredToken")
            .field("access_token", &"***") // Never log tokens
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl StoredToken {
    /// Create a token with no expiry metadata.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expiry: None,
        }
    }

    /// Whether the token's recorded expiry has passed. Tokens without an
    /// expiry are assumed live; the server is the final authority.
    pub fn is_expired(&self) -> bool {
        match self.expiry {
            Some(expiry) => expiry <= Utc::now(),
            None => false,
        }
    }
}

/// File-backed token store under the platform config directory.
pub struct TokenCache {
    path: PathBuf,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCache {
    /// Cache at the default per-user location, keyed by [`API_NAME`].
    pub fn new() -> Self {
        Self {
            path: Self::default_path(),
        }
    }

    /// Cache at a specific file path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// The file this cache reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tagman")
            .join(format!("{API_NAME}.json"))
    }

    /// Load the cached token, `None` when no cache file exists yet.
    pub fn load(&self) -> Result<Option<StoredToken>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Persist a token, creating parent directories as needed.
    pub fn store(&self, token: &StoredToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(token)?)?;
        Ok(())
    }

    /// Delete the cache file if present.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    #[test]
    fn store_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let cache = TokenCache::with_path(dir.path().join("tagmanager.json"));
        assert!(cache.load().unwrap().is_none());

        let mut token = StoredToken::new("ya29.secret");
        token.refresh_token = Some("1//refresh".to_string());
        cache.store(&token).unwrap();

        let loaded = cache.load().unwrap().expect("token present");
        assert_eq!(loaded.access_token, "ya29.secret");
        assert_eq!(loaded.refresh_token.as_deref(), Some("1//refresh"));
    }

    #[test]
    fn clear_removes_the_cache_file() {
        let dir = TempDir::new().unwrap();
        let cache = TokenCache::with_path(dir.path().join("tagmanager.json"));
        cache.store(&StoredToken::new("t")).unwrap();
        cache.clear().unwrap();
        assert!(cache.load().unwrap().is_none());
        // Clearing twice is fine.
        cache.clear().unwrap();
    }

    #[test]
    fn expiry_in_the_past_marks_the_token_expired() {
        let mut token = StoredToken::new("t");
        assert!(!token.is_expired());
        token.expiry = Some(Utc::now() - Duration::minutes(1));
        assert!(token.is_expired());
        token.expiry = Some(Utc::now() + Duration::minutes(10));
        assert!(!token.is_expired());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut token = StoredToken::new("ya29.secret");
        token.refresh_token = Some("1//refresh".to_string());
        let debug = format!("{token:?}");
        assert!(!debug.contains("ya29.secret"));
        assert!(!debug.contains("1//refresh"));
    }
}
