//! Cache Manager Module
//!
//! Policy layer consumed by the query orchestrator: resolves TTLs, encodes
//! structured keys, honours the enable switch and owns the disposal
//! lifecycle. Storage is delegated to a [`MemoryStore`].

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::cache::{CacheEntry, CacheKey, CacheLogger, CacheStats, MemoryStore, TracingLogger};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::models::{DataSource, DataType};
use crate::tasks::spawn_cleanup_task;

// == Set Options ==
/// Per-write overrides for [`CacheManager::set_with`].
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    /// Replaces the configured TTL for this entry
    pub ttl: Option<Duration>,
    /// Labels for bulk invalidation
    pub tags: HashSet<String>,
}

impl SetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }
}

// == Manager Stats ==
/// Statistics for every cache tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagerStats {
    pub memory: CacheStats,
}

// == Cache Manager ==
/// Shared handle to a query-result cache.
///
/// Cloning is cheap and every clone refers to the same store. All methods
/// return a neutral result (miss, `false`, `0`, no-op) when the cache is
/// disabled or disposed.
pub struct CacheManager<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    config: CacheConfig,
    logger: Arc<dyn CacheLogger>,
    store: RwLock<MemoryStore<T>>,
    disposed: AtomicBool,
}

impl<T> Clone for CacheManager<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> CacheManager<T> {
    // == Constructor ==
    /// Creates a manager from a validated configuration.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;

        let store = MemoryStore::new(config.max_memory_entries)?;
        let logger: Arc<dyn CacheLogger> = match &config.logger {
            Some(logger) => Arc::clone(logger),
            None => Arc::new(TracingLogger),
        };

        logger.info(&format!(
            "cache initialized: enabled={}, default_ttl={}s, max_memory_entries={}",
            config.enabled,
            config.default_ttl.as_secs(),
            config.max_memory_entries
        ));

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                logger,
                store: RwLock::new(store),
                disposed: AtomicBool::new(false),
            }),
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.config.enabled
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    fn is_active(&self) -> bool {
        self.inner.config.enabled && !self.is_disposed()
    }

    /// The configured logger, or the tracing fallback.
    pub(crate) fn logger(&self) -> &dyn CacheLogger {
        self.inner.logger.as_ref()
    }

    // == TTL Resolution ==
    /// Resolves the effective TTL: override, then per data type, then default.
    pub fn resolve_ttl(&self, data_type: DataType, ttl_override: Option<Duration>) -> Duration {
        ttl_override
            .or_else(|| self.inner.config.ttl_by_data_type.get(&data_type).copied())
            .unwrap_or(self.inner.config.default_ttl)
    }

    // == Get ==
    /// Looks up a cached result. Returns `None` on miss, expiry, or when inactive.
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<T>> {
        if !self.is_active() {
            return None;
        }

        let canonical = key.encode();
        let data = self.inner.store.write().await.get(&canonical);

        let outcome = if data.is_some() { "hit" } else { "miss" };
        self.inner
            .logger
            .debug(&format!("cache {}: {}", outcome, canonical));
        data
    }

    // == Set ==
    /// Stores a result using the resolved TTL and no tags.
    pub async fn set(&self, key: &CacheKey, data: T) {
        self.set_with(key, data, SetOptions::default()).await;
    }

    /// Stores a result with an optional TTL override and tags.
    pub async fn set_with(&self, key: &CacheKey, data: T, options: SetOptions) {
        if !self.is_active() {
            return;
        }

        let canonical = key.encode();
        let ttl = self.resolve_ttl(key.data_type, options.ttl);
        let entry = CacheEntry::new(data, key.source, key.data_type, ttl).with_tags(options.tags);

        // A dispose may have cleared the store while this write waited for the lock
        let mut store = self.inner.store.write().await;
        if self.is_disposed() {
            return;
        }
        store.set(canonical.clone(), entry);
        drop(store);

        self.inner.logger.debug(&format!(
            "cache set: {} (ttl={}ms)",
            canonical,
            ttl.as_millis()
        ));
    }

    // == Delete ==
    /// Removes one cached result. Returns whether it existed.
    pub async fn delete(&self, key: &CacheKey) -> bool {
        if !self.is_active() {
            return false;
        }

        let canonical = key.encode();
        self.inner.store.write().await.delete(&canonical)
    }

    /// Checks for a live entry without counting a lookup.
    pub async fn has(&self, key: &CacheKey) -> bool {
        if !self.is_active() {
            return false;
        }

        let canonical = key.encode();
        self.inner.store.read().await.has(&canonical)
    }

    // == Clear ==
    pub async fn clear(&self) {
        if !self.is_active() {
            return;
        }

        self.inner.store.write().await.clear();
        self.inner.logger.info("cache cleared");
    }

    // == Invalidation ==
    /// Removes every result fetched from `source`.
    pub async fn invalidate_by_source(&self, source: DataSource) -> usize {
        if !self.is_active() {
            return 0;
        }

        let removed = self.inner.store.write().await.invalidate_by_source(source);
        self.inner.logger.info(&format!(
            "invalidated {} entries for source {}",
            removed, source
        ));
        removed
    }

    /// Removes every result carrying at least one of `tags`.
    pub async fn invalidate_by_tags<I, S>(&self, tags: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.is_active() {
            return 0;
        }

        let removed = self.inner.store.write().await.invalidate_by_tags(tags);
        self.inner
            .logger
            .info(&format!("invalidated {} entries by tag", removed));
        removed
    }

    // == Cleanup ==
    /// Sweeps expired entries. Returns the number removed.
    pub async fn cleanup(&self) -> usize {
        if !self.is_active() {
            return 0;
        }

        let removed = self.inner.store.write().await.cleanup();
        if removed > 0 {
            self.inner
                .logger
                .debug(&format!("cleanup removed {} expired entries", removed));
        }
        removed
    }

    // == Stats ==
    pub async fn stats(&self) -> ManagerStats {
        ManagerStats {
            memory: self.inner.store.read().await.stats(),
        }
    }

    // == Dispose ==
    /// Clears the store and makes the manager inert. Safe to call repeatedly.
    pub async fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        self.inner.store.write().await.clear();
        self.inner.logger.info("cache disposed");
    }
}

impl<T: Send + Sync + 'static> CacheManager<T> {
    // == Auto Cleanup ==
    /// Spawns the periodic sweep when `auto_cleanup` is configured.
    ///
    /// The task stops by itself once the manager is disposed. Must be called
    /// from within a Tokio runtime.
    pub fn start_auto_cleanup(&self) -> Option<JoinHandle<()>> {
        if !self.inner.config.auto_cleanup || !self.is_active() {
            return None;
        }

        Some(spawn_cleanup_task(
            self.clone(),
            self.inner.config.cleanup_interval,
        ))
    }
}
