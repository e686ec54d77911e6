use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;

#[derive(Clone)]
struct CachedValue {
    data: String,
    ttl: Duration,
}

/// 按条目设置过期时间
struct PerEntryExpiry;

impl Expiry<String, CachedValue> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

pub struct MokaCacheWrapper {
    inner: Cache<String, CachedValue>,
    default_ttl: Duration,
}

impl Default for MokaCacheWrapper {
    fn default() -> Self {
        let config = AppConfig::get();
        Self::new(config.cache.memory.max_capacity, config.cache.default_ttl)
    }
}

impl MokaCacheWrapper {
    pub fn new(max_capacity: u64, default_ttl: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryExpiry)
            .build();

        debug!(
            "MokaCacheWrapper initialized with max capacity: {}",
            max_capacity
        );
        Self {
            inner,
            default_ttl: Duration::from_secs(default_ttl),
        }
    }
}

#[async_trait]
impl ObjectCache for MokaCacheWrapper {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        if let Some(value) = self.inner.get(key).await {
            debug!("Successfully retrieved key: {}", key);
            CacheResult::Found(value.data)
        } else {
            debug!("Key not found in cache: {}", key);
            CacheResult::NotFound
        }
    }

    async fn insert_raw(&self, key: String, value: String, ttl: u64) {
        // ttl 为 0 时使用全局默认值
        let ttl = if ttl == 0 {
            self.default_ttl
        } else {
            Duration::from_secs(ttl)
        };
        self.inner.insert(key, CachedValue { data: value, ttl }).await;
    }

    async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }
}
