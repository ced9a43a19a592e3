//! Permission graph cache ownership
//!
//! The registrar is the sole owner of the cached graph lifecycle. Reads
//! go through the cache and fall back to a whole-graph rebuild from a
//! store snapshot; mutations invalidate the single cache key so that
//! every engine instance sharing the cache backend converges.

use crate::cache::CacheClient;
use crate::config::AccessConfig;
use crate::error::Result;
use crate::graph::PermissionGraph;
use crate::store::EntityStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cache-coherent access to the derived permission graph
///
/// The registrar holds no graph state of its own. Every read consults
/// the shared cache backend, so an invalidation performed by any other
/// process is honored on the next call.
pub struct Registrar {
    store: Arc<dyn EntityStore>,
    cache: Arc<dyn CacheClient>,
    config: AccessConfig,
}

impl Registrar {
    /// Create a registrar over a store and a shared cache backend
    pub fn new(
        store: Arc<dyn EntityStore>,
        cache: Arc<dyn CacheClient>,
        config: AccessConfig,
    ) -> Self {
        Self {
            store,
            cache,
            config,
        }
    }

    /// The cache key this registrar reads and invalidates
    pub fn cache_key(&self) -> &str {
        &self.config.cache_key
    }

    /// Current permission graph, from cache or rebuilt from the store
    ///
    /// A corrupt cached payload is discarded with a warning and treated
    /// as a miss rather than failing authorization checks.
    pub async fn permissions(&self) -> Result<PermissionGraph> {
        if let Some(bytes) = self.cache.get(&self.config.cache_key).await? {
            match PermissionGraph::from_bytes(&bytes) {
                Ok(graph) => {
                    debug!("Permission graph cache hit");
                    return Ok(graph);
                }
                Err(e) => {
                    warn!("Discarding corrupt permission graph payload: {}", e);
                    self.cache.forget(&self.config.cache_key).await?;
                }
            }
        }

        self.rebuild().await
    }

    /// Drop the cached graph so the next read rebuilds it
    pub async fn invalidate(&self) -> Result<()> {
        self.cache.forget(&self.config.cache_key).await?;
        debug!("Invalidated permission graph cache");
        Ok(())
    }

    async fn rebuild(&self) -> Result<PermissionGraph> {
        let snapshot = self.store.snapshot().await?;
        let graph = PermissionGraph::build(&snapshot);
        self.cache
            .put(&self.config.cache_key, graph.to_bytes()?)
            .await?;

        info!(
            "Rebuilt permission graph: {} subjects, {} permissions",
            graph.subject_count(),
            snapshot.permissions.len()
        );
        Ok(graph)
    }
}
