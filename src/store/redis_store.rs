use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::debug;

use super::{RecordStore, StoreError};

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
}

impl RedisSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(value) = lookup("REDIS_HOST")
            && !value.trim().is_empty()
        {
            settings.host = value.trim().to_string();
        }
        if let Some(value) = lookup("REDIS_PORT")
            && let Ok(parsed) = value.trim().parse::<u16>()
        {
            settings.port = parsed;
        }
        if let Some(value) = lookup("REDIS_AUTH")
            && !value.is_empty()
        {
            settings.password = Some(value);
        }
        if let Some(value) = lookup("REDIS_DB")
            && let Ok(parsed) = value.trim().parse::<i64>()
        {
            settings.db = parsed.max(0);
        }

        settings
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            password: None,
            db: 0,
        }
    }
}

/// Redis-backed store. The connection manager is multiplexed and reconnects
/// on its own, so clones of this handle can be used from any task.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(settings: &RedisSettings) -> Result<Self, StoreError> {
        let info = redis::ConnectionInfo {
            addr: redis::ConnectionAddr::Tcp(settings.host.clone(), settings.port),
            redis: redis::RedisConnectionInfo {
                db: settings.db,
                password: settings.password.clone(),
                ..Default::default()
            },
        };
        let client = redis::Client::open(info)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl RecordStore for RedisStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        match ttl {
            // SETEX rejects a zero expiry.
            Some(ttl) => {
                let () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
            }
            None => {
                let () = conn.set(key, value).await?;
            }
        }
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, StoreError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        Ok(conn.del(keys).await?)
    }

    async fn list_push_front(&self, list: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let () = conn.lpush(list, value).await?;
        Ok(())
    }

    async fn list_trim(&self, list: &str, keep: usize) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        if keep == 0 {
            let () = conn.del(list).await?;
            return Ok(());
        }
        let () = conn.ltrim(list, 0, keep as isize - 1).await?;
        Ok(())
    }

    async fn list_range(
        &self,
        list: &str,
        limit: Option<usize>,
    ) -> Result<Vec<String>, StoreError> {
        let stop = match limit {
            Some(0) => return Ok(Vec::new()),
            Some(limit) => limit as isize - 1,
            None => -1,
        };
        let mut conn = self.conn.clone();
        Ok(conn.lrange(list, 0, stop).await?)
    }

    async fn push_bounded(&self, list: &str, value: &str, cap: usize) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let stop = cap.max(1) as isize - 1;
        debug!(list, cap, "pushing to bounded list");
        let () = redis::pipe()
            .atomic()
            .lpush(list, value)
            .ignore()
            .ltrim(list, 0, stop)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}
