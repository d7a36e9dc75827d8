use std::sync::Arc;

use crate::config::{AppConfig, StoreBackend};
use crate::database::{DatabaseError, DatabaseManager, PgCustomerRepository, PgProgressRepository};
use crate::services::ProgressService;
use crate::store::MemoryStore;

/// Shared application state available to all handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub progress: ProgressService,
    pub config: Arc<AppConfig>,
    /// Present only when running against Postgres
    pub pool: Option<sqlx::PgPool>,
}

impl AppState {
    pub fn in_memory(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            progress: ProgressService::new(store.clone(), store),
            config: Arc::new(config),
            pool: None,
        }
    }

    pub async fn from_config(config: AppConfig) -> Result<Self, DatabaseError> {
        match config.progress.store_backend {
            StoreBackend::Memory => {
                tracing::info!("Using in-memory progress store");
                Ok(Self::in_memory(config))
            }
            StoreBackend::Postgres => {
                let manager = DatabaseManager::new(&config.database)?;
                let pool = manager.connect().await?;
                if config.database.run_migrations {
                    DatabaseManager::run_migrations(&pool).await?;
                }
                tracing::info!("Using Postgres progress store");

                Ok(Self {
                    progress: ProgressService::new(
                        Arc::new(PgProgressRepository::new(pool.clone())),
                        Arc::new(PgCustomerRepository::new(pool.clone())),
                    ),
                    config: Arc::new(config),
                    pool: Some(pool),
                })
            }
        }
    }
}
