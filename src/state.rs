use crate::config::AppConfig;
use crate::storage::{FileStore, UserStore};
use crate::users::repo::UserRepo;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserRepo,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = Arc::new(FileStore::new(&config.users_file)) as Arc<dyn UserStore>;
        Ok(Self::from_parts(config, store))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn UserStore>) -> Self {
        Self {
            config,
            users: UserRepo::new(store),
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with(Arc::new(MemoryStore::default()))
    }

    #[cfg(test)]
    pub fn fake_with(store: Arc<dyn UserStore>) -> Self {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            users_file: "unused.json".into(),
        });
        Self::from_parts(config, store)
    }
}

#[cfg(test)]
pub use fake::MemoryStore;

#[cfg(test)]
mod fake {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    };

    use async_trait::async_trait;

    use crate::storage::{StorageError, UserStore};
    use crate::users::repo_types::User;

    /// Keeps the collection in process memory; `fail` makes every call error.
    #[derive(Default)]
    pub struct MemoryStore {
        users: Mutex<Vec<User>>,
        pub fail: AtomicBool,
    }

    impl MemoryStore {
        fn check(&self) -> Result<(), StorageError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StorageError::Io {
                    path: "memory".into(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl UserStore for MemoryStore {
        async fn load(&self) -> Result<Vec<User>, StorageError> {
            self.check()?;
            Ok(self.users.lock().unwrap().clone())
        }

        async fn save(&self, users: &[User]) -> Result<(), StorageError> {
            self.check()?;
            *self.users.lock().unwrap() = users.to_vec();
            Ok(())
        }
    }
}
