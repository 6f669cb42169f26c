use redis::{Client, RedisError, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use uuid::Uuid;

use crate::models::gigs::GigView;

#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }

    /// Get a JSON value from cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> redis::RedisResult<Option<T>> {
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await?;

        match value {
            Some(v) => serde_json::from_str(&v).map(Some).map_err(|e| {
                RedisError::from((
                    redis::ErrorKind::TypeError,
                    "Deserialization error",
                    e.to_string(),
                ))
            }),
            None => Ok(None),
        }
    }

    /// Set a JSON value with a TTL
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> redis::RedisResult<()> {
        let serialized = serde_json::to_string(value).map_err(|e| {
            RedisError::from((
                redis::ErrorKind::TypeError,
                "Serialization error",
                e.to_string(),
            ))
        })?;

        redis::cmd("SET")
            .arg(key)
            .arg(serialized)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut self.connection.clone())
            .await
    }

    pub async fn delete(&self, key: &str) -> redis::RedisResult<()> {
        redis::cmd("DEL")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await
    }
}

/// Cache key generators
pub mod keys {
    use uuid::Uuid;

    pub fn gig(id: Uuid) -> String {
        format!("gig:{id}")
    }
}

/// Read-through cache for single-gig lookups.
///
/// Runs without redis when none is configured. Cache errors are logged and
/// treated as misses; they never fail the request.
#[derive(Clone)]
pub struct GigCache {
    redis: Option<RedisCache>,
    ttl: Duration,
}

impl GigCache {
    pub fn new(redis: Option<RedisCache>, ttl: Duration) -> Self {
        Self { redis, ttl }
    }

    pub async fn get(&self, id: Uuid) -> Option<GigView> {
        let redis = self.redis.as_ref()?;
        match redis.get::<GigView>(&keys::gig(id)).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(gig_id = %id, error = %e, "gig cache read failed");
                None
            }
        }
    }

    /// Only gigs that have left `open` are cached. Every write path (edit,
    /// cancel, delete, hire) requires an open gig, so a cached view can never
    /// go stale, even when a read races a write and stores after its
    /// invalidation.
    pub fn is_cacheable(view: &GigView) -> bool {
        !view.gig.status.is_open()
    }

    pub async fn put(&self, view: &GigView) {
        if !Self::is_cacheable(view) {
            return;
        }
        let Some(redis) = &self.redis else { return };
        if let Err(e) = redis.set(&keys::gig(view.gig.id), view, self.ttl).await {
            tracing::warn!(gig_id = %view.gig.id, error = %e, "gig cache write failed");
        }
    }

    pub async fn invalidate(&self, id: Uuid) {
        let Some(redis) = &self.redis else { return };
        if let Err(e) = redis.delete(&keys::gig(id)).await {
            tracing::warn!(gig_id = %id, error = %e, "gig cache invalidation failed");
        }
    }
}
