// Persistence of the bearer token pair between sessions

use crate::error::ClientError;
use crate::models::AuthTokens;
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};

pub trait TokenStore: Send + Sync + 'static {
    fn load(&self) -> Option<AuthTokens>;

    fn save(&self, tokens: &AuthTokens) -> Result<(), ClientError>;

    fn clear(&self) -> Result<(), ClientError>;

    fn access_token(&self) -> Option<String> {
        self.load().map(|t| t.access)
    }
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<AuthTokens>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: AuthTokens) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<AuthTokens> {
        self.tokens.read().clone()
    }

    fn save(&self, tokens: &AuthTokens) -> Result<(), ClientError> {
        *self.tokens.write() = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.tokens.write().take();
        Ok(())
    }
}

// JSON file on disk; reads go through an in-memory copy loaded once
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    cached: RwLock<Option<AuthTokens>>,
}

impl FileTokenStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cached = read_tokens(&path);
        Self {
            path,
            cached: RwLock::new(cached),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<AuthTokens> {
        self.cached.read().clone()
    }

    fn save(&self, tokens: &AuthTokens) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ClientError::TokenStorage(format!("Cannot create {}: {}", parent.display(), e))
            })?;
        }
        let json = serde_json::to_vec_pretty(tokens)
            .map_err(|e| ClientError::TokenStorage(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| {
            ClientError::TokenStorage(format!("Cannot write {}: {}", self.path.display(), e))
        })?;

        *self.cached.write() = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.cached.write().take();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::TokenStorage(format!(
                "Cannot remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

// A corrupt or missing file means "logged out"
fn read_tokens(path: &Path) -> Option<AuthTokens> {
    let raw = fs::read(path).ok()?;
    match serde_json::from_slice(&raw) {
        Ok(tokens) => Some(tokens),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable token file");
            None
        }
    }
}
