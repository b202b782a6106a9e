//! Redis-backed `UserCache` implementation.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection, RunError};
use bb8_redis::redis::{AsyncCommands, RedisError};

use crate::domain::ports::{UserCache, UserCacheError};
use crate::domain::{User, UserId};

const KEY_PREFIX: &str = "user:v1:";

/// Connection and expiry settings.
#[derive(Debug, Clone)]
pub struct RedisUserCacheSettings {
    pub url: String,
    pub ttl: Duration,
    pub max_connections: u32,
    pub connection_timeout: Duration,
}

impl RedisUserCacheSettings {
    pub fn new(url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            url: url.into(),
            ttl,
            max_connections: 8,
            connection_timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Clone)]
pub struct RedisUserCache {
    pool: Pool<RedisConnectionManager>,
    ttl_seconds: u64,
}

fn cache_key(id: &UserId) -> String {
    format!("{KEY_PREFIX}{id}")
}

fn map_redis_error(error: RedisError) -> UserCacheError {
    UserCacheError::backend(error.to_string())
}

fn map_run_error(error: RunError<RedisError>) -> UserCacheError {
    match error {
        RunError::User(error) => map_redis_error(error),
        RunError::TimedOut => UserCacheError::backend("timed out waiting for a redis connection"),
    }
}

fn decode(payload: &str) -> Result<User, UserCacheError> {
    serde_json::from_str(payload).map_err(|err| UserCacheError::serialization(err.to_string()))
}

impl RedisUserCache {
    /// Build the connection pool. Connections are opened lazily.
    pub async fn connect(settings: RedisUserCacheSettings) -> Result<Self, UserCacheError> {
        let manager = RedisConnectionManager::new(settings.url).map_err(map_redis_error)?;
        let pool = Pool::builder()
            .max_size(settings.max_connections)
            .connection_timeout(settings.connection_timeout)
            .build(manager)
            .await
            .map_err(map_redis_error)?;
        Ok(Self {
            pool,
            ttl_seconds: settings.ttl.as_secs().max(1),
        })
    }

    async fn connection(
        &self,
    ) -> Result<PooledConnection<'_, RedisConnectionManager>, UserCacheError> {
        self.pool.get().await.map_err(map_run_error)
    }
}

#[async_trait]
impl UserCache for RedisUserCache {
    async fn get(&self, id: &UserId) -> Result<Option<User>, UserCacheError> {
        let mut conn = self.connection().await?;
        let payload: Option<String> = conn.get(cache_key(id)).await.map_err(map_redis_error)?;
        payload.as_deref().map(decode).transpose()
    }

    async fn put(&self, user: &User) -> Result<(), UserCacheError> {
        let payload = serde_json::to_string(user)
            .map_err(|err| UserCacheError::serialization(err.to_string()))?;
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(cache_key(user.id()), payload, self.ttl_seconds)
            .await
            .map_err(map_redis_error)
    }

    async fn invalidate(&self, id: &UserId) -> Result<(), UserCacheError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(cache_key(id))
            .await
            .map_err(map_redis_error)
    }
}
