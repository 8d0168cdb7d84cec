use deadpool_redis::{Runtime, redis::AsyncCommands};
use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

use crate::{ENV, api::error};

/// Opens the Postgres pool and brings the schema up to date.
pub async fn connect_database() -> Result<PgPool, error::SystemError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_slow_threshold(std::time::Duration::from_secs(3))
        .connect(&ENV.database_url)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| error::SystemError::InternalError(Box::new(e)))?;
    log::info!("Database migrations applied");

    Ok(pool)
}

pub fn user_cache_key(user_id: &Uuid) -> String {
    format!("user:{user_id}")
}

pub fn refresh_token_key(jti: &Uuid) -> String {
    format!("refresh_token:{jti}")
}

/// Byte-level key/value store with expiry behind the profile cache and refresh tokens.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, error::SystemError>;

    async fn set_bytes(
        &self,
        key: &str,
        value: Vec<u8>,
        expiration: usize,
    ) -> Result<(), error::SystemError>;

    /// Reads and removes a key in one step.
    async fn take_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, error::SystemError>;

    async fn delete(&self, key: &str) -> Result<(), error::SystemError>;
}

/// JSON helpers on top of any [`CacheStore`].
impl dyn CacheStore {
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, error::SystemError>
    where
        T: serde::de::DeserializeOwned,
    {
        let value = self.get_bytes(key).await?;
        value.map(|v| serde_json::from_slice(&v)).transpose().map_err(Into::into)
    }

    pub async fn set<T>(
        &self,
        key: &str,
        value: &T,
        expiration: usize,
    ) -> Result<(), error::SystemError>
    where
        T: serde::Serialize,
    {
        let serialized = serde_json::to_vec(value)?;
        self.set_bytes(key, serialized, expiration).await
    }

    /// Single-use values such as refresh tokens.
    pub async fn take<T>(&self, key: &str) -> Result<Option<T>, error::SystemError>
    where
        T: serde::de::DeserializeOwned,
    {
        let value = self.take_bytes(key).await?;
        value.map(|v| serde_json::from_slice(&v)).transpose().map_err(Into::into)
    }
}

pub struct RedisCache {
    pool: deadpool_redis::Pool,
}

impl RedisCache {
    pub async fn new() -> Result<Self, error::SystemError> {
        let mut cfg = deadpool_redis::Config::from_url(&ENV.redis_url);
        cfg.pool = Some(deadpool_redis::PoolConfig { max_size: 16, ..Default::default() });
        let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl CacheStore for RedisCache {
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, error::SystemError> {
        let mut conn = self.pool.get().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_bytes(
        &self,
        key: &str,
        value: Vec<u8>,
        expiration: usize,
    ) -> Result<(), error::SystemError> {
        let mut conn = self.pool.get().await?;
        conn.set_ex::<_, _, ()>(key, value, expiration as u64).await?;
        Ok(())
    }

    async fn take_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, error::SystemError> {
        let mut conn = self.pool.get().await?;
        let value: Option<Vec<u8>> = conn.get_del(key).await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<(), error::SystemError> {
        let mut conn = self.pool.get().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}
