use std::sync::Arc;

use tracing::info;

use crate::config::{AppConfig, StoreBackend};
use crate::db;
use crate::foods::memory::MemoryFoodStore;
use crate::foods::repo::{FoodStore, PgFoodStore};

/// Process-wide handles. Built once before the server binds; call
/// [`AppState::shutdown`] after the server stops.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FoodStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Self::connect(config).await
    }

    pub async fn connect(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn FoodStore> = match config.store_backend {
            StoreBackend::Postgres => {
                let pool = db::connect(&config).await?;
                db::migrate(&pool).await;
                Arc::new(PgFoodStore::new(pool))
            }
            StoreBackend::Memory => {
                info!("using in-memory food store; data is lost on exit");
                Arc::new(MemoryFoodStore::new())
            }
        };
        Ok(Self::from_parts(store, Arc::new(config)))
    }

    pub fn from_parts(store: Arc<dyn FoodStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// Memory-backed state with default config.
    pub fn in_memory() -> Self {
        Self::from_parts(
            Arc::new(MemoryFoodStore::new()),
            Arc::new(AppConfig::default()),
        )
    }

    pub async fn shutdown(&self) {
        self.store.close().await;
        info!("food store closed");
    }
}
