use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::{error::AppError, storage::UserStore, users::repo_types::User};

/// Collection access with a single writer at a time.
///
/// Reads share the lock; every load-mutate-save cycle holds it exclusively,
/// so two concurrent mutations can no longer overwrite each other.
#[derive(Clone)]
pub struct UserRepo {
    store: Arc<dyn UserStore>,
    gate: Arc<RwLock<()>>,
}

impl UserRepo {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            gate: Arc::new(RwLock::new(())),
        }
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let _read = self.gate.read().await;
        Ok(self.store.load().await?)
    }

    pub async fn find(&self, id: &str) -> Result<Option<User>, AppError> {
        let users = self.list().await?;
        Ok(users.into_iter().find(|u| u.id == id))
    }

    /// Runs `f` on the loaded collection and persists it if `f` succeeds.
    pub async fn mutate<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Vec<User>) -> Result<T, AppError>,
    {
        let _write = self.gate.write().await;
        let mut users = self.store.load().await?;
        let out = f(&mut users)?;
        self.store.save(&users).await?;
        debug!(count = users.len(), "collection mutated");
        Ok(out)
    }

    pub async fn insert(&self, user: User) -> Result<User, AppError> {
        self.mutate(|users| {
            users.push(user.clone());
            Ok(user)
        })
        .await
    }

    /// Applies `f` to the user with `id`, returning the updated record.
    pub async fn update<F>(&self, id: &str, f: F) -> Result<User, AppError>
    where
        F: FnOnce(&mut User) -> Result<(), AppError>,
    {
        self.mutate(|users| {
            let user = users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or(AppError::NotFound)?;
            f(user)?;
            Ok(user.clone())
        })
        .await
    }

    pub async fn remove(&self, id: &str) -> Result<User, AppError> {
        self.mutate(|users| {
            let idx = users
                .iter()
                .position(|u| u.id == id)
                .ok_or(AppError::NotFound)?;
            Ok(users.remove(idx))
        })
        .await
    }
}
