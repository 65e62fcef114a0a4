use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::services::stores::MatchCache;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
struct Entry {
    payload: Arc<str>,
    ttl: Duration,
}

/// Lets every L1 entry expire after the TTL it was written with
struct PerEntryTtl;

impl moka::Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Two-tier cache manager
///
/// L1 is an in-process moka cache, L2 is Redis and shared across instances.
/// Without a Redis connection the manager runs on L1 alone.
pub struct CacheManager {
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, Entry>,
}

impl CacheManager {
    /// Connect to Redis and build the L1 tier
    pub async fn new(redis_url: &str, l1_size: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(Arc::new(tokio::sync::Mutex::new(redis))),
            l1_cache: build_l1(l1_size),
        })
    }

    /// L1-only cache, no Redis
    pub fn in_memory(l1_size: u64) -> Self {
        Self {
            redis: None,
            l1_cache: build_l1(l1_size),
        }
    }

    /// Use Redis when configured and reachable, otherwise fall back to L1 only
    pub async fn connect_or_degrade(redis_url: Option<&str>, l1_size: u64) -> Self {
        match redis_url {
            Some(url) => match Self::new(url, l1_size).await {
                Ok(cache) => cache,
                Err(e) => {
                    tracing::warn!("Failed to connect to Redis ({}), running with in-process cache only", e);
                    Self::in_memory(l1_size)
                }
            },
            None => Self::in_memory(l1_size),
        }
    }

    pub fn has_redis(&self) -> bool {
        self.redis.is_some()
    }

    /// Number of entries currently held in L1
    pub fn l1_entry_count(&self) -> u64 {
        self.l1_cache.entry_count()
    }
}

fn build_l1(l1_size: u64) -> moka::future::Cache<String, Entry> {
    moka::future::Cache::builder()
        .max_capacity(l1_size)
        .expire_after(PerEntryTtl)
        .build()
}

impl MatchCache for CacheManager {
    /// Get a value from cache (L1 first, then L2)
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        if let Some(entry) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(Some(entry.payload.to_string()));
        }

        let Some(redis) = &self.redis else {
            tracing::trace!("Cache miss: {}", key);
            return Ok(None);
        };

        let mut conn = redis.lock().await;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut *conn)
            .await?;
        let remaining_ttl: i64 = if value.is_some() {
            redis::cmd("TTL").arg(key).query_async(&mut *conn).await?
        } else {
            -2
        };
        drop(conn);

        match value {
            Some(json) => {
                tracing::trace!("L2 cache hit: {}", key);

                // Populate L1 for the rest of the entry's lifetime only
                if remaining_ttl > 0 {
                    let entry = Entry {
                        payload: Arc::from(json.as_str()),
                        ttl: Duration::from_secs(remaining_ttl as u64),
                    };
                    self.l1_cache.insert(key.to_string(), entry).await;
                }

                Ok(Some(json))
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Ok(None)
            }
        }
    }

    /// Set a value in cache (both L1 and L2)
    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError> {
        let entry = Entry {
            payload: Arc::from(value.as_str()),
            ttl: Duration::from_secs(ttl_secs),
        };
        self.l1_cache.insert(key.to_string(), entry).await;

        // SETEX rejects a zero TTL; such entries live only until L1 evicts them
        if let Some(redis) = self.redis.as_ref().filter(|_| ttl_secs > 0) {
            let mut conn = redis.lock().await;
            let _: () = redis::cmd("SETEX")
                .arg(key)
                .arg(ttl_secs)
                .arg(value)
                .query_async(&mut *conn)
                .await?;
        }

        tracing::trace!("Cache set: {} (ttl {}s)", key, ttl_secs);
        Ok(())
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a request's match list
    pub fn matches(request_id: &str) -> String {
        format!("matches:{}", request_id)
    }
}
