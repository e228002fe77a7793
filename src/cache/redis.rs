//! Redis-backed [`CacheStore`].
//!
//! Uses one multiplexed async connection, cloned per call. `set_if_absent`
//! maps to `SET key value NX EX ttl`, which Redis executes atomically.

use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, ExistenceCheck, SetExpiry, SetOptions};

use crate::cache::CacheStore;
use crate::config::RedisConfig;
use crate::error::Result;

/// A [`CacheStore`] over a Redis server.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    /// Connect using a `redis://` URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        tracing::info!("Redis connection established");
        Ok(Self { conn })
    }

    /// Connect using discrete connection parameters.
    pub async fn connect_with(config: &RedisConfig) -> Result<Self> {
        tracing::debug!(host = %config.host, port = config.port, db = config.db, "connecting to Redis");
        Self::connect(&config.url()).await
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes, ttl_secs: u64) -> Result<()> {
        let mut conn = self.conn.clone();
        let () = conn.set_ex(key, value.to_vec(), ttl_secs).await?;
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: Bytes, ttl_secs: u64) -> Result<bool> {
        let mut conn = self.conn.clone();
        let opts = SetOptions::default()
            .conditional_set(ExistenceCheck::NX)
            .with_expiration(SetExpiry::EX(ttl_secs));
        let reply: Option<String> = conn.set_options(key, value.to_vec(), opts).await?;
        Ok(reply.is_some())
    }

    async fn ttl(&self, key: &str) -> Result<Option<i64>> {
        let mut conn = self.conn.clone();
        let ttl: i64 = conn.ttl(key).await?;
        // -2: no such key.
        Ok((ttl != -2).then_some(ttl))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let mut keys: Vec<String> = conn.keys(pattern).await?;
        keys.sort();
        Ok(keys)
    }
}
