use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::Instant;

use super::{RecordStore, StoreError};

/// In-process store with the same semantics as the Redis backend.
///
/// Expired values are dropped lazily on read. [`MemoryStore::set_unreachable`]
/// makes every call fail as if the server had gone away;
/// [`MemoryStore::set_lists_unreachable`] fails only the list commands.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    unreachable: AtomicBool,
    lists_unreachable: AtomicBool,
}

#[derive(Default)]
struct Inner {
    values: HashMap<String, Entry>,
    lists: HashMap<String, VecDeque<String>>,
}

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn set_lists_unreachable(&self, unreachable: bool) {
        self.lists_unreachable.store(unreachable, Ordering::SeqCst);
    }

    fn lock_lists(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        if self.lists_unreachable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("list commands refused".to_string()));
        }
        self.lock()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut inner = self.lock()?;
        let now = Instant::now();
        match inner.values.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                inner.values.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        inner.values.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, StoreError> {
        let mut inner = self.lock()?;
        let now = Instant::now();
        let mut removed = 0;
        for key in keys {
            if let Some(entry) = inner.values.remove(key) {
                if entry.is_live(now) {
                    removed += 1;
                }
            } else if inner.lists.remove(key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn list_push_front(&self, list: &str, value: &str) -> Result<(), StoreError> {
        let mut inner = self.lock_lists()?;
        inner
            .lists
            .entry(list.to_string())
            .or_default()
            .push_front(value.to_string());
        Ok(())
    }

    async fn list_trim(&self, list: &str, keep: usize) -> Result<(), StoreError> {
        let mut inner = self.lock_lists()?;
        if keep == 0 {
            inner.lists.remove(list);
        } else if let Some(entries) = inner.lists.get_mut(list) {
            entries.truncate(keep);
        }
        Ok(())
    }

    async fn list_range(
        &self,
        list: &str,
        limit: Option<usize>,
    ) -> Result<Vec<String>, StoreError> {
        let inner = self.lock_lists()?;
        let Some(entries) = inner.lists.get(list) else {
            return Ok(Vec::new());
        };
        let take = limit.unwrap_or(entries.len());
        Ok(entries.iter().take(take).cloned().collect())
    }
}
