use std::sync::Arc;

use tracing::info;

use crate::auth::repo::UserStore;
use crate::config::{AppConfig, StoreBackend};
use crate::db::{self, PgStore};
use crate::memory::MemoryStore;
use crate::posts::repo::PostStore;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub posts: Arc<dyn PostStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        Self::from_config(AppConfig::from_env()?).await
    }

    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        match config.store {
            StoreBackend::Postgres => {
                let pool = db::connect(&config).await?;
                db::migrate(&pool).await?;
                info!("using postgres store");
                let store = Arc::new(PgStore::new(pool));
                Ok(Self::from_parts(store.clone(), store, Arc::new(config)))
            }
            StoreBackend::Memory => {
                info!("using in-memory store");
                let store = Arc::new(MemoryStore::default());
                Ok(Self::from_parts(store.clone(), store, Arc::new(config)))
            }
        }
    }

    pub fn from_parts(
        users: Arc<dyn UserStore>,
        posts: Arc<dyn PostStore>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            users,
            posts,
            config,
        }
    }

    /// Fresh empty in-memory state.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::default());
        Self::from_parts(store.clone(), store, Arc::new(AppConfig::in_memory()))
    }
}
