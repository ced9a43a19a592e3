//! Cache client contract and in-memory backend

use crate::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;

/// Byte-oriented cache shared by every engine instance of a deployment
///
/// The engine stores exactly one value, the serialized permission graph,
/// under the configured cache key. Backends make no attempt to interpret
/// the payload.
#[async_trait]
pub trait CacheClient: Send + Sync {
    /// Fetch the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Drop `key`; succeeds when the key is already absent
    async fn forget(&self, key: &str) -> Result<()>;
}

/// Process-local cache backend on a thread-safe map
///
/// Suitable for tests and single-process deployments. Multi-process
/// deployments point every instance at a shared backend (memcached,
/// redis) through the same trait, otherwise invalidation in one process
/// leaves the others serving stale graphs.
// TODO: redis-backed client behind a feature flag, mirroring this trait
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn forget(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
