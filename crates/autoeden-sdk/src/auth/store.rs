//! Persistence for the authentication record

use super::types::{data_dir, AuthState};
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Durable storage for [`AuthState`]
///
/// Implementations must be safe to call from concurrent requests. `clear`
/// on an empty store is not an error.
#[async_trait]
pub trait AuthStore: Send + Sync + std::fmt::Debug {
    async fn load(&self) -> Result<Option<AuthState>>;

    async fn save(&self, state: &AuthState) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

/// Process-local store, used by tests and short-lived tools
#[derive(Debug, Default)]
pub struct MemoryAuthStore {
    state: RwLock<Option<AuthState>>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: AuthState) -> Self {
        Self {
            state: RwLock::new(Some(state)),
        }
    }
}

#[async_trait]
impl AuthStore for MemoryAuthStore {
    async fn load(&self) -> Result<Option<AuthState>> {
        Ok(self.state.read().clone())
    }

    async fn save(&self, state: &AuthState) -> Result<()> {
        *self.state.write() = Some(state.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.state.write() = None;
        Ok(())
    }
}

/// JSON file store with an in-memory cache
///
/// The record lives at `<data dir>/autoeden/auth.json` unless a path is given.
#[derive(Debug)]
pub struct FileAuthStore {
    path: PathBuf,
    // None until the first load; Some(None) once the file is known to be absent
    cache: RwLock<Option<Option<AuthState>>>,
}

impl FileAuthStore {
    pub const FILE_NAME: &'static str = "auth.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
        }
    }

    /// Store at the platform default location
    pub fn default_location() -> Result<Self> {
        let dir = data_dir().map_err(storage_error)?;
        Ok(Self::new(dir.join(Self::FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> Result<Option<AuthState>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let state = serde_json::from_slice(&bytes).map_err(|e| ApiError::Storage {
                    message: format!("corrupt auth file {}: {e}", self.path.display()),
                })?;
                Ok(Some(state))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(e)),
        }
    }

    /// Cache a value read from disk unless a save or clear got there first
    fn remember(&self, read: Option<AuthState>) -> Option<AuthState> {
        self.cache.write().get_or_insert(read).clone()
    }
}

#[async_trait]
impl AuthStore for FileAuthStore {
    async fn load(&self) -> Result<Option<AuthState>> {
        if let Some(cached) = self.cache.read().as_ref() {
            return Ok(cached.clone());
        }

        let state = self.read_file().await?;
        Ok(self.remember(state))
    }

    async fn save(&self, state: &AuthState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(storage_error)?;
        }

        let contents = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, contents).await.map_err(storage_error)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&tmp, permissions)
                .await
                .map_err(storage_error)?;
        }

        tokio::fs::rename(&tmp, &self.path).await.map_err(storage_error)?;
        *self.cache.write() = Some(Some(state.clone()));
        debug!("Saved auth state to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!("Removed auth state at {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(storage_error(e)),
        }
        *self.cache.write() = Some(None);
        Ok(())
    }
}

fn storage_error(e: std::io::Error) -> ApiError {
    ApiError::Storage {
        message: e.to_string(),
    }
}
