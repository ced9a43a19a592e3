//! Engine configuration

/// Cache key under which the permission graph payload is stored by default
pub const DEFAULT_CACHE_KEY: &str = "warden.permission-graph";

/// Access engine configuration
#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// Cache key for the whole-graph payload
    ///
    /// Every process pointed at the same cache backend must use the same
    /// key, otherwise invalidation in one process is invisible to the rest.
    pub cache_key: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            cache_key: DEFAULT_CACHE_KEY.to_string(),
        }
    }
}

impl AccessConfig {
    /// Create a configuration with a custom cache key
    pub fn with_cache_key(cache_key: impl Into<String>) -> Self {
        Self {
            cache_key: cache_key.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cache_key() {
        let config = AccessConfig::default();
        assert_eq!(config.cache_key, DEFAULT_CACHE_KEY);
    }

    #[test]
    fn test_custom_cache_key() {
        let config = AccessConfig::with_cache_key("tenant-7.graph");
        assert_eq!(config.cache_key, "tenant-7.graph");
    }
}
