//! The shared key-value store the poller writes and the query surface reads.
//!
//! The store is the only mutable state shared between workers. Every
//! operation is a single-key primitive; nothing here relies on multi-key
//! transactions. Entries expire through their TTL and are never deleted
//! explicitly.
//!
//! ## Key grammar
//!
//! | Key | Value | TTL |
//! |---|---|---|
//! | `option_chain:{scrip}_{segment}` | chain snapshot JSON | 300 s |
//! | `expiry_date:{scrip}_{segment}` | `YYYY-MM-DD` | 300 s |
//! | `nine_thirty_data:{scrip}_{segment}` | opening snapshot JSON | 86 340 s |
//!
//! Implementations: [`MemoryStore`] (in-process) and, with the `redis`
//! feature, [`RedisStore`].

use async_trait::async_trait;
use bytes::Bytes;

use crate::constants::{EXPIRY_DATE_PREFIX, OPENING_PREFIX, OPTION_CHAIN_PREFIX};
use crate::error::Result;
use crate::types::instrument::Instrument;

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use self::redis::RedisStore;

/// A key-value store with per-key TTLs.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Value under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Store `value` under `key`, replacing any previous value and TTL.
    async fn set(&self, key: &str, value: Bytes, ttl_secs: u64) -> Result<()>;

    /// Store `value` only if `key` is absent. Returns whether it was written.
    ///
    /// Atomic with respect to every other operation on the same key.
    async fn set_if_absent(&self, key: &str, value: Bytes, ttl_secs: u64) -> Result<bool>;

    /// Remaining TTL of `key` in seconds; `None` if the key does not exist,
    /// `Some(-1)` if it exists without an expiry.
    async fn ttl(&self, key: &str) -> Result<Option<i64>>;

    /// Live keys matching a glob `pattern` (`*` and `?` wildcards).
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;

    /// Whether `key` currently holds a value.
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

/// `option_chain:{scrip}_{segment}`
pub fn option_chain_key(instrument: &Instrument) -> String {
    format!("{OPTION_CHAIN_PREFIX}:{}", instrument.key_suffix())
}

/// `expiry_date:{scrip}_{segment}`
pub fn expiry_date_key(instrument: &Instrument) -> String {
    format!("{EXPIRY_DATE_PREFIX}:{}", instrument.key_suffix())
}

/// `nine_thirty_data:{scrip}_{segment}`
pub fn opening_key(instrument: &Instrument) -> String {
    format!("{OPENING_PREFIX}:{}", instrument.key_suffix())
}
