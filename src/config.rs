use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::services::conversations::UnresolvedNamePolicy;

/// Where durable data lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL through a connection pool.
    Postgres,
    /// Process-local maps. Data is lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!(
                "unknown STORAGE_BACKEND '{}' (expected postgres or memory)",
                other
            ),
        }
    }
}

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_POOL_MAX_SIZE: usize = 16;

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: Option<String>,
    /// The URL of the Redis server. `None` disables the cache.
    pub redis_url: Option<String>,
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The storage backend.
    pub storage_backend: StorageBackend,
    /// What the history endpoint does with user ids it cannot resolve.
    pub unresolved_name_policy: UnresolvedNamePolicy,
    /// The maximum number of pooled database connections.
    pub db_pool_max_size: usize,
}

impl Config {
    /// In-memory storage, no cache, every other setting at its default.
    ///
    /// Unlike [`Config::from_env`], which defaults to postgres, this needs no
    /// external service.
    pub fn for_memory() -> Self {
        Self {
            database_url: None,
            redis_url: None,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            storage_backend: StorageBackend::Memory,
            unresolved_name_policy: UnresolvedNamePolicy::default(),
            db_pool_max_size: DEFAULT_DB_POOL_MAX_SIZE,
        }
    }

    /// Creates a new `Config` from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a `Config` from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::Postgres,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set when STORAGE_BACKEND is postgres");
        }

        let redis_url = match lookup("REDIS_URL") {
            Some(url) if url.trim().is_empty() => None,
            Some(url) => Some(url),
            None => Some(DEFAULT_REDIS_URL.to_string()),
        };

        let bind_addr: SocketAddr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("Invalid BIND_ADDR (expected host:port)")?;

        let unresolved_name_policy = match lookup("UNRESOLVED_NAME_POLICY") {
            Some(value) => value.parse()?,
            None => UnresolvedNamePolicy::default(),
        };

        let db_pool_max_size = match lookup("DB_POOL_MAX_SIZE") {
            Some(value) => value
                .parse::<usize>()
                .context("Invalid DB_POOL_MAX_SIZE")?,
            None => DEFAULT_DB_POOL_MAX_SIZE,
        };
        if db_pool_max_size == 0 {
            anyhow::bail!("DB_POOL_MAX_SIZE must be at least 1");
        }

        Ok(Self {
            database_url,
            redis_url,
            bind_addr,
            storage_backend,
            unresolved_name_policy,
            db_pool_max_size,
        })
    }
}
