//! Record store abstraction.
//!
//! The receiver only needs a handful of key-value and list primitives:
//! get/set with optional expiry, delete, and push/trim/range on a list.
//! [`RedisStore`] talks to a real Redis server; [`MemoryStore`] keeps
//! everything in-process and can be switched unreachable for tests.

mod memory;
mod redis_store;

use std::time::Duration;

use async_trait::async_trait;

pub use memory::MemoryStore;
pub use redis_store::{RedisSettings, RedisStore};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt value at {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value`, replacing any previous one. `None` means no expiry.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Returns how many of `keys` existed.
    async fn delete(&self, keys: &[String]) -> Result<u64, StoreError>;

    async fn list_push_front(&self, list: &str, value: &str) -> Result<(), StoreError>;

    /// Keeps only the first `keep` entries of `list`.
    async fn list_trim(&self, list: &str, keep: usize) -> Result<(), StoreError>;

    /// First `limit` entries of `list`, or all of them when `limit` is `None`.
    async fn list_range(&self, list: &str, limit: Option<usize>)
    -> Result<Vec<String>, StoreError>;

    /// Pushes `value` to the front of `list` and trims it to `cap` entries.
    ///
    /// The default issues two independent calls, so a concurrent push can
    /// briefly leave the list above `cap` until its own trim lands.
    async fn push_bounded(&self, list: &str, value: &str, cap: usize) -> Result<(), StoreError> {
        self.list_push_front(list, value).await?;
        self.list_trim(list, cap).await
    }
}
