use std::sync::Arc;

use deadpool_postgres::Pool;

use crate::cache::Cache;
use crate::config::{Config, StorageBackend};
use crate::error::{AppError, Result};
use crate::metrics::Metrics;
use crate::repositories::{
    memory::MemoryStore,
    message::PgMessageRepository,
    session::PgSessionRepository,
    user::PgUserRepository,
};
use crate::services::{identity::IdentityStore, messages::MessageStore, sessions::SessionStore};

/// The application's state.
///
/// Every store is built once at startup and shared by cloning.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Config,
    /// Users and name resolution.
    pub identity: IdentityStore,
    /// Bearer-token sessions.
    pub sessions: SessionStore,
    /// Direct messages.
    pub messages: MessageStore,
    /// The database connection pool, when the postgres backend is in use.
    pub db: Option<Pool>,
    /// The Redis cache, unless disabled or unreachable at startup.
    pub cache: Option<Cache>,
    /// Request counters exposed on `/metrics`.
    pub metrics: Metrics,
}

impl AppState {
    /// Creates a new `AppState`, connecting to every configured backend.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let mut state = match config.storage_backend {
            StorageBackend::Postgres => {
                let database_url = config.database_url.as_deref().ok_or_else(|| {
                    AppError::Internal("DATABASE_URL is required for postgres".to_string())
                })?;
                let pool = crate::db::create_pool(database_url, config.db_pool_max_size)?;
                crate::db::run_migrations(&pool).await?;
                tracing::info!(
                    "✅ PostgreSQL Pool initialized (max {} connections)",
                    config.db_pool_max_size
                );
                Self::postgres(config.clone(), pool)?
            }
            StorageBackend::Memory => {
                tracing::warn!("⚠️ Using in-memory storage, data is lost on restart");
                Self::in_memory(config.clone())?
            }
        };

        state.cache = match config.redis_url.as_deref() {
            Some(redis_url) => connect_cache(redis_url).await,
            None => {
                tracing::info!("Cache disabled");
                None
            }
        };

        Ok(state)
    }

    /// State backed by PostgreSQL repositories sharing one pool.
    pub fn postgres(config: Config, pool: Pool) -> Result<Self> {
        Ok(Self {
            config,
            identity: IdentityStore::new(Arc::new(PgUserRepository::new(pool.clone()))),
            sessions: SessionStore::new(Arc::new(PgSessionRepository::new(pool.clone()))),
            messages: MessageStore::new(Arc::new(PgMessageRepository::new(pool.clone()))),
            db: Some(pool),
            cache: None,
            metrics: Metrics::new()?,
        })
    }

    /// State backed by a fresh in-memory store and no cache.
    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        Ok(Self {
            config,
            identity: IdentityStore::new(store.clone()),
            sessions: SessionStore::new(store.clone()),
            messages: MessageStore::new(store),
            db: None,
            cache: None,
            metrics: Metrics::new()?,
        })
    }

    /// Closes the pool so no new connections are handed out.
    pub fn close(&self) {
        if let Some(pool) = &self.db {
            pool.close();
            tracing::info!("✅ Database pool closed");
        }
    }
}

/// Connects the cache, or logs and carries on without it.
///
/// An unreachable Redis shows up on `/health` as `disabled`.
async fn connect_cache(redis_url: &str) -> Option<Cache> {
    match Cache::connect(redis_url).await {
        Ok(cache) => {
            tracing::info!("✅ Redis Connection Manager initialized");
            Some(cache)
        }
        Err(e) => {
            tracing::warn!("⚠️ Redis unreachable at startup, cache disabled: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_cache_does_not_block_startup() {
        let mut config = Config::for_memory();
        // Nothing listens on the discard port.
        config.redis_url = Some("redis://127.0.0.1:9/".to_string());

        let state = AppState::new(&config).await.unwrap();
        assert!(state.cache.is_none());
        assert!(state.db.is_none());
    }

    #[tokio::test]
    async fn test_malformed_cache_url_disables_cache() {
        let mut config = Config::for_memory();
        config.redis_url = Some("not a url".to_string());

        let state = AppState::new(&config).await.unwrap();
        assert!(state.cache.is_none());
    }
}
