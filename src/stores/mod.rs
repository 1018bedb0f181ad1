//! Named key/value stores shared by the stub endpoints.
//!
//! A [`Stores`] value is one mock session: every [`Store`] opened from it (or from
//! a clone of it) sees the same data. Tests get a clean session by building a new
//! [`Stores`]; a running server is reset through the `/system/store` routes.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use redis::{aio::ConnectionManager, AsyncCommands};
use serde_json::{Map, Value};
use thiserror::Error;

const REDIS_KEY_PREFIX: &str = "stores";

type MemoryStores = Arc<Mutex<HashMap<String, Map<String, Value>>>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("stored value for `{key}` is not valid JSON: {source}")]
    Encoding {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("in-memory store lock was poisoned")]
    Poisoned,
}

/// The backend holding every named store of a session.
#[derive(Clone)]
pub enum Stores {
    Memory(MemoryStores),
    Redis(ConnectionManager),
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory(_) => write!(f, "Stores::Memory"),
            Self::Redis(_) => write!(f, "Stores::Redis"),
        }
    }
}

impl Stores {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::Memory(Arc::default())
    }

    /// Connects to Redis; each named store becomes the hash `stores:<name>`.
    ///
    /// # Errors
    /// Returns a `redis::RedisError` if the URL is invalid or the connection cannot be established.
    pub async fn redis(redis_url: &str) -> redis::RedisResult<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self::Redis(ConnectionManager::new(client).await?))
    }

    /// Opens a named store. Nothing is created until a value is saved.
    #[must_use]
    pub fn open(&self, name: &str) -> Store {
        Store {
            name: name.to_string(),
            backend: self.clone(),
        }
    }

    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Redis(_) => "redis",
        }
    }
}

/// A handle on one named store.
#[derive(Debug, Clone)]
pub struct Store {
    name: String,
    backend: Stores,
}

impl Store {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn redis_key(&self) -> String {
        format!("{REDIS_KEY_PREFIX}:{}", self.name)
    }

    /// Loads the value saved under `key`, if any.
    ///
    /// # Errors
    /// Returns a `StoreError` if the backend fails or the stored value cannot be decoded.
    pub async fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        match &self.backend {
            Stores::Memory(stores) => {
                let stores = stores.lock().map_err(|_| StoreError::Poisoned)?;
                Ok(stores
                    .get(&self.name)
                    .and_then(|items| items.get(key))
                    .cloned())
            }
            Stores::Redis(redis) => {
                let mut redis = redis.clone();
                let raw: Option<String> = redis.hget(self.redis_key(), key).await?;
                raw.map(|raw| decode(key, &raw)).transpose()
            }
        }
    }

    /// Saves `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns a `StoreError` if the backend fails.
    pub async fn save(&self, key: &str, value: Value) -> Result<(), StoreError> {
        tracing::debug!(store = %self.name, key, %value, "saving store item");

        match &self.backend {
            Stores::Memory(stores) => {
                let mut stores = stores.lock().map_err(|_| StoreError::Poisoned)?;
                stores
                    .entry(self.name.clone())
                    .or_default()
                    .insert(key.to_string(), value);
                Ok(())
            }
            Stores::Redis(redis) => {
                let mut redis = redis.clone();
                redis
                    .hset::<_, _, _, ()>(self.redis_key(), key, value.to_string())
                    .await?;
                Ok(())
            }
        }
    }

    /// Loads every item of the store.
    ///
    /// # Errors
    /// Returns a `StoreError` if the backend fails or a stored value cannot be decoded.
    pub async fn load_all(&self) -> Result<Map<String, Value>, StoreError> {
        match &self.backend {
            Stores::Memory(stores) => {
                let stores = stores.lock().map_err(|_| StoreError::Poisoned)?;
                Ok(stores.get(&self.name).cloned().unwrap_or_default())
            }
            Stores::Redis(redis) => {
                let mut redis = redis.clone();
                let raw: HashMap<String, String> = redis.hgetall(self.redis_key()).await?;
                raw.into_iter()
                    .map(|(key, raw)| decode(&key, &raw).map(|value| (key, value)))
                    .collect()
            }
        }
    }

    /// Removes every item of the store.
    ///
    /// # Errors
    /// Returns a `StoreError` if the backend fails.
    pub async fn clear(&self) -> Result<(), StoreError> {
        tracing::info!(store = %self.name, "clearing store");

        match &self.backend {
            Stores::Memory(stores) => {
                let mut stores = stores.lock().map_err(|_| StoreError::Poisoned)?;
                stores.remove(&self.name);
                Ok(())
            }
            Stores::Redis(redis) => {
                let mut redis = redis.clone();
                redis.del::<_, ()>(self.redis_key()).await?;
                Ok(())
            }
        }
    }
}

fn decode(key: &str, raw: &str) -> Result<Value, StoreError> {
    serde_json::from_str(raw).map_err(|source| StoreError::Encoding {
        key: key.to_string(),
        source,
    })
}
