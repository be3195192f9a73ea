//! Durable storage for the bearer token and the signed-in user.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::Result;
use crate::models::User;

/// What survives a restart: the token and the user it was issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub user: User,
}

/// Persistent credential storage read at startup.
pub trait CredentialStore: Send + Sync {
    /// Stored credentials, or `None` when signed out.
    fn load(&self) -> Result<Option<Credentials>>;

    fn save(&self, credentials: &Credentials) -> Result<()>;

    /// Remove stored credentials. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}

/// Credentials kept as a JSON file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credentials>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(credentials)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process credential storage.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credentials>> {
        Ok(self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::models::Role;

    fn credentials() -> Credentials {
        Credentials {
            token: "abc.def.ghi".to_string(),
            user: User {
                id: 2,
                username: "user".to_string(),
                role: Role::Worker,
            },
        }
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        let store = FileCredentialStore::new(&path);
        assert_eq!(store.load().unwrap(), None);
        store.save(&credentials()).unwrap();

        let reopened = FileCredentialStore::new(&path);
        assert_eq!(reopened.load().unwrap(), Some(credentials()));

        reopened.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        reopened.clear().unwrap();
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, b"not json").unwrap();

        assert!(FileCredentialStore::new(&path).load().is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryCredentialStore::new();
        store.save(&credentials()).unwrap();
        assert_eq!(store.load().unwrap().unwrap().user.username, "user");
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
