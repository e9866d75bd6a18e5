use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::users::repo_types::User;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("i/o on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a valid user collection: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Whole-collection access to persisted users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns the persisted collection, initializing it to `[]` when nothing exists yet.
    async fn load(&self) -> Result<Vec<User>, StorageError>;
    /// Overwrites the persisted collection.
    async fn save(&self, users: &[User]) -> Result<(), StorageError>;
}

/// Keeps the collection as a pretty-printed JSON array in one file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Sibling scratch file, unique per call so concurrent saves never share one.
    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "users.json".into());
        name.push(format!(".{}.tmp", Uuid::new_v4()));
        self.path.with_file_name(name)
    }

    async fn ensure_parent(&self) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| self.io(e))?;
        }
        Ok(())
    }

    /// Creates the file holding `[]` unless someone else already did.
    async fn init_empty(&self) -> Result<(), StorageError> {
        self.ensure_parent().await?;
        let created = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await;
        match created {
            Ok(mut file) => {
                file.write_all(b"[]").await.map_err(|e| self.io(e))?;
                file.flush().await.map_err(|e| self.io(e))?;
                info!(path = %self.path.display(), "initialized empty collection");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(self.io(e)),
        }
    }
}

#[async_trait]
impl UserStore for FileStore {
    async fn load(&self) -> Result<Vec<User>, StorageError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.init_empty().await?;
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io(e)),
        };
        // a racing init_empty may have created the file but not written `[]` yet
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let users: Vec<User> =
            serde_json::from_slice(&raw).map_err(|source| StorageError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        debug!(count = users.len(), "collection loaded");
        Ok(users)
    }

    async fn save(&self, users: &[User]) -> Result<(), StorageError> {
        self.ensure_parent().await?;
        let body = serde_json::to_vec_pretty(users).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        // write-then-rename: readers see either the old or the new collection
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &body).await.map_err(|e| self.io(e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.io(e));
        }
        debug!(count = users.len(), "collection saved");
        Ok(())
    }
}
