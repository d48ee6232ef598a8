use deadpool_redis::{Runtime, redis::AsyncCommands};
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::api::error;

/// Handle to the relational data store.
///
/// Built once in `main` and handed to every repository. When no database is
/// configured the store is `Unavailable` and every access reports
/// `SystemError::Unavailable` instead of touching a connection.
#[derive(Clone)]
pub enum Store {
    Connected(PgPool),
    Unavailable,
}

impl Store {
    pub fn pool(&self) -> Result<&PgPool, error::SystemError> {
        match self {
            Store::Connected(pool) => Ok(pool),
            Store::Unavailable => Err(error::SystemError::Unavailable),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Store::Connected(_))
    }
}

pub async fn connect_store(database_url: Option<&str>) -> Result<Store, error::SystemError> {
    let Some(database_url) = database_url else {
        return Ok(Store::Unavailable);
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_slow_threshold(std::time::Duration::from_secs(3))
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Database connected and migrations applied");

    Ok(Store::Connected(pool))
}

/// JSON value cache backed by Redis. A cache built with `disabled()` misses
/// on every read and ignores writes.
pub struct RedisCache {
    pool: Option<deadpool_redis::Pool>,
}

impl RedisCache {
    pub async fn new(redis_url: Option<&str>) -> Result<Self, error::SystemError> {
        let Some(redis_url) = redis_url else {
            return Ok(Self::disabled());
        };

        let mut cfg = deadpool_redis::Config::from_url(redis_url);
        cfg.pool = Some(deadpool_redis::PoolConfig { max_size: 16, ..Default::default() });
        let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
        Ok(Self { pool: Some(pool) })
    }

    pub fn disabled() -> Self {
        Self { pool: None }
    }

    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, error::SystemError>
    where
        T: serde::de::DeserializeOwned,
    {
        let Some(pool) = &self.pool else {
            return Ok(None);
        };
        let mut conn = pool.get().await?;

        let value: Option<Vec<u8>> = conn.get(key).await?;

        match value {
            Some(v) => {
                let parsed = serde_json::from_slice(&v)?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
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
        let Some(pool) = &self.pool else {
            return Ok(());
        };
        let mut conn = pool.get().await?;

        let serialized = serde_json::to_vec(value)?;

        conn.set_ex::<_, _, ()>(key, serialized, expiration as u64).await?;

        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<(), error::SystemError> {
        let Some(pool) = &self.pool else {
            return Ok(());
        };
        let mut conn = pool.get().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}
