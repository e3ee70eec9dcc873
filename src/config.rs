//! Configuration Module
//!
//! Cache policy supplied once when constructing a `CacheManager`.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::CacheLogger;
use crate::error::{CacheError, Result};
use crate::models::DataType;

/// Cache policy parameters.
///
/// Values can be loaded from environment variables with sensible defaults.
/// Changing policy means building a new manager from a new config.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// When false, the manager stores nothing and every lookup misses
    pub enabled: bool,
    /// TTL used when neither an override nor a per-type TTL applies
    pub default_ttl: Duration,
    /// Per data type TTLs, taking precedence over `default_ttl`
    pub ttl_by_data_type: HashMap<DataType, Duration>,
    /// Maximum number of entries in the memory tier
    pub max_memory_entries: usize,
    /// Whether `start_auto_cleanup` should spawn the sweep task
    pub auto_cleanup: bool,
    /// Interval between sweeps of the cleanup task
    pub cleanup_interval: Duration,
    /// Log sink, `TracingLogger` when absent
    pub logger: Option<Arc<dyn CacheLogger>>,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `HEALTH_CACHE_ENABLED` - Enable caching (default: true)
    /// - `HEALTH_CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `HEALTH_CACHE_MAX_ENTRIES` - Maximum memory entries (default: 1000)
    /// - `HEALTH_CACHE_AUTO_CLEANUP` - Run the sweep task (default: true)
    /// - `HEALTH_CACHE_CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_parse("HEALTH_CACHE_ENABLED").unwrap_or(defaults.enabled),
            default_ttl: env_parse("HEALTH_CACHE_DEFAULT_TTL")
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_ttl),
            max_memory_entries: env_parse("HEALTH_CACHE_MAX_ENTRIES")
                .unwrap_or(defaults.max_memory_entries),
            auto_cleanup: env_parse("HEALTH_CACHE_AUTO_CLEANUP").unwrap_or(defaults.auto_cleanup),
            cleanup_interval: env_parse("HEALTH_CACHE_CLEANUP_INTERVAL")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup_interval),
            ..defaults
        }
    }

    // == Builders ==
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Sets the TTL for one data type.
    pub fn with_data_type_ttl(mut self, data_type: DataType, ttl: Duration) -> Self {
        self.ttl_by_data_type.insert(data_type, ttl);
        self
    }

    pub fn with_max_entries(mut self, max_memory_entries: usize) -> Self {
        self.max_memory_entries = max_memory_entries;
        self
    }

    pub fn with_auto_cleanup(mut self, interval: Duration) -> Self {
        self.auto_cleanup = true;
        self.cleanup_interval = interval;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn CacheLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Turns caching off entirely.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    // == Validate ==
    /// Rejects parameters the manager cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_memory_entries == 0 {
            return Err(CacheError::InvalidConfig(
                "max_memory_entries must be at least 1".to_string(),
            ));
        }
        if self.auto_cleanup && self.cleanup_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "cleanup_interval must be non-zero when auto_cleanup is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl: Duration::from_secs(300),
            ttl_by_data_type: HashMap::new(),
            max_memory_entries: 1000,
            auto_cleanup: true,
            cleanup_interval: Duration::from_secs(60),
            logger: None,
        }
    }
}

fn env_parse<V: std::str::FromStr>(name: &str) -> Option<V> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
