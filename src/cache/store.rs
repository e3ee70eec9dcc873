//! Memory Store Module
//!
//! Capacity-bounded entry storage combining a HashMap with LRU tracking,
//! TTL expiration and a tag index. Keys are canonical key strings; the store
//! never interprets them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;

use crate::cache::{CacheEntry, CacheStats, LruTracker};
use crate::error::{CacheError, Result};
use crate::models::DataSource;

// == Memory Store ==
/// In-memory cache tier with LRU eviction, TTL expiry and bulk invalidation.
#[derive(Debug)]
pub struct MemoryStore<T> {
    /// Canonical key -> entry
    entries: HashMap<String, CacheEntry<T>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Tag -> canonical keys carrying it
    tag_index: HashMap<String, HashSet<String>>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
}

impl<T> MemoryStore<T> {
    // == Constructor ==
    /// Creates an empty store holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "memory store capacity must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            tag_index: HashMap::new(),
            stats: CacheStats::new(),
            capacity,
        })
    }

    // == Set ==
    /// Stores an entry, fully replacing any previous entry under `key`.
    ///
    /// Inserting a new key into a full store first sweeps expired entries,
    /// counted as expirations. Only if the store is still full is the least
    /// recently used live entry evicted. Replacing an existing key never evicts.
    pub fn set(&mut self, key: String, entry: CacheEntry<T>) {
        let is_update = self.entries.contains_key(&key);

        if !is_update && self.entries.len() >= self.capacity {
            let swept = self.purge_expired();
            self.stats.record_expirations(swept);
        }

        if !is_update && self.entries.len() >= self.capacity {
            if let Some(evicted_key) = self.lru.evict_oldest() {
                if let Some(evicted) = self.entries.remove(&evicted_key) {
                    self.unindex_tags(&evicted_key, &evicted.tags);
                }
                self.stats.record_eviction();
            }
        }

        self.index_tags(&key, &entry.tags);
        self.lru.touch(&key);
        if let Some(previous) = self.entries.insert(key.clone(), entry) {
            let stale_tags: Vec<String> = match self.entries.get(&key) {
                Some(current) => previous.tags.difference(&current.tags).cloned().collect(),
                None => Vec::new(),
            };
            self.unindex_tags(&key, stale_tags.iter());
        }
    }

    // == Get ==
    /// Retrieves the payload stored under `key`.
    ///
    /// Missing and expired entries are misses; expired entries are dropped.
    pub fn get(&mut self, key: &str) -> Option<Arc<T>> {
        let Some(entry) = self.entries.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if entry.is_expired_at(Utc::now()) {
            self.remove(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        let data = Arc::clone(&entry.data);
        self.stats.record_hit();
        self.lru.touch(key);
        Some(data)
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether it existed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove(key).is_some()
    }

    // == Has ==
    /// Checks for a live, unexpired entry without affecting stats or recency.
    pub fn has(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(Utc::now()))
    }

    // == Keys ==
    /// Returns every stored key, including expired entries not yet swept.
    pub fn keys(&self) -> HashSet<String> {
        self.entries.keys().cloned().collect()
    }

    // == Clear ==
    /// Drops every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.tag_index.clear();
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&mut self) -> usize {
        let count = self.purge_expired();
        self.stats.record_expirations(count);
        count
    }

    // == Invalidate By Tags ==
    /// Removes every entry carrying at least one of `tags`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_by_tags<I, S>(&mut self, tags: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let matched: HashSet<String> = tags
            .into_iter()
            .filter_map(|tag| self.tag_index.get(tag.as_ref()))
            .flatten()
            .cloned()
            .collect();

        let count = matched.len();
        for key in matched {
            self.remove(&key);
        }

        self.stats.record_invalidations(count);
        count
    }

    // == Invalidate By Source ==
    /// Removes every entry fetched from `source`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_by_source(&mut self, source: DataSource) -> usize {
        let matched: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.source == source)
            .map(|(key, _)| key.clone())
            .collect();

        let count = matched.len();
        for key in matched {
            self.remove(&key);
        }

        self.stats.record_invalidations(count);
        count
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }

    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Internal Helpers ==
    /// Drops every entry expired at the current instant, returning how many.
    fn purge_expired(&mut self) -> usize {
        let now = Utc::now();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove(key);
        }
        expired_keys.len()
    }

    /// Removes an entry together with its recency and tag bookkeeping.
    fn remove(&mut self, key: &str) -> Option<CacheEntry<T>> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(key);
        self.unindex_tags(key, &entry.tags);
        Some(entry)
    }

    fn index_tags<'a>(&mut self, key: &str, tags: impl IntoIterator<Item = &'a String>) {
        for tag in tags {
            self.tag_index
                .entry(tag.clone())
                .or_default()
                .insert(key.to_string());
        }
    }

    fn unindex_tags<'a>(&mut self, key: &str, tags: impl IntoIterator<Item = &'a String>) {
        for tag in tags {
            if let Some(keys) = self.tag_index.get_mut(tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.tag_index.remove(tag);
                }
            }
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key::CacheKey;
    use crate::models::DataType;
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(300);

    fn key(source: DataSource, day: u32) -> String {
        CacheKey::new(
            source,
            DataType::Steps,
            format!("2024-01-{:02}", day),
            format!("2024-01-{:02}", day + 1),
        )
        .encode()
    }

    fn entry(source: DataSource, value: &str) -> CacheEntry<String> {
        CacheEntry::new(value.to_string(), source, DataType::Steps, TTL)
    }

    fn expired(source: DataSource, value: &str) -> CacheEntry<String> {
        entry(source, value).with_expires_at(Utc::now() - chrono::Duration::seconds(1))
    }

    fn store(capacity: usize) -> MemoryStore<String> {
        MemoryStore::new(capacity).unwrap()
    }

    #[test]
    fn test_store_new() {
        let store = store(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 100);
    }

    #[test]
    fn test_store_rejects_zero_capacity() {
        let result = MemoryStore::<String>::new(0);
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store(100);
        let k = key(DataSource::Fitbit, 1);

        store.set(k.clone(), entry(DataSource::Fitbit, "value1"));

        assert_eq!(store.get(&k).as_deref().map(String::as_str), Some("value1"));
        assert_eq!(store.len(), 1);
        assert!(store.has(&k));
        assert_eq!(store.keys(), HashSet::from([k]));
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store(100);
        assert!(store.get("missing").is_none());
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store = store(100);
        let k = key(DataSource::Fitbit, 1);

        store.set(k.clone(), entry(DataSource::Fitbit, "value1"));

        assert!(store.delete(&k));
        assert!(!store.delete(&k));
        assert!(store.is_empty());
        assert!(store.get(&k).is_none());
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store(100);
        let k = key(DataSource::Fitbit, 1);

        store.set(k.clone(), entry(DataSource::Fitbit, "value1"));
        store.set(k.clone(), entry(DataSource::Fitbit, "value2"));

        assert_eq!(store.get(&k).as_deref().map(String::as_str), Some("value2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = store(3);
        let keys: Vec<String> = (1..=4).map(|day| key(DataSource::Fitbit, day)).collect();

        for k in &keys {
            store.set(k.clone(), entry(DataSource::Fitbit, k));
        }

        assert_eq!(store.len(), 3);
        assert_eq!(store.stats().evictions, 1);
        assert!(!store.has(&keys[0]));
        assert!(store.has(&keys[1]));
        assert!(store.has(&keys[2]));
        assert!(store.has(&keys[3]));
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = store(3);
        let keys: Vec<String> = (1..=4).map(|day| key(DataSource::Fitbit, day)).collect();

        for k in &keys[..3] {
            store.set(k.clone(), entry(DataSource::Fitbit, k));
        }

        // Reading k1 makes k2 the eviction candidate
        assert!(store.get(&keys[0]).is_some());
        store.set(keys[3].clone(), entry(DataSource::Fitbit, "k4"));

        assert!(store.has(&keys[0]));
        assert!(!store.has(&keys[1]));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_lru_touch_on_update() {
        let mut store = store(2);
        let (k1, k2, k3) = (
            key(DataSource::Fitbit, 1),
            key(DataSource::Fitbit, 2),
            key(DataSource::Fitbit, 3),
        );

        store.set(k1.clone(), entry(DataSource::Fitbit, "a"));
        store.set(k2.clone(), entry(DataSource::Fitbit, "b"));
        store.set(k1.clone(), entry(DataSource::Fitbit, "a2"));
        store.set(k3.clone(), entry(DataSource::Fitbit, "c"));

        assert!(store.has(&k1));
        assert!(!store.has(&k2));
    }

    #[test]
    fn test_store_update_in_full_store_does_not_evict() {
        let mut store = store(3);
        let keys: Vec<String> = (1..=3).map(|day| key(DataSource::Fitbit, day)).collect();

        for k in &keys {
            store.set(k.clone(), entry(DataSource::Fitbit, k));
        }
        store.set(keys[0].clone(), entry(DataSource::Fitbit, &"x".repeat(10_000)));

        let stats = store.stats();
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.evictions, 0);
        assert!(keys.iter().all(|k| store.has(k)));
    }

    #[test]
    fn test_store_expired_get_is_miss() {
        let mut store = store(100);
        let k = key(DataSource::Fitbit, 1);

        store.set(k.clone(), expired(DataSource::Fitbit, "stale"));

        assert!(!store.has(&k));
        assert!(store.get(&k).is_none());

        let stats = store.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.entries, 0);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = store(100);
        let stale = key(DataSource::Fitbit, 1);
        let fresh = key(DataSource::Fitbit, 2);

        store.set(stale.clone(), expired(DataSource::Fitbit, "stale"));
        store.set(fresh.clone(), entry(DataSource::Fitbit, "fresh"));

        assert_eq!(store.cleanup(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get(&fresh).is_some());
        assert_eq!(store.stats().evictions, 0);
        assert_eq!(store.cleanup(), 0);
    }

    #[test]
    fn test_store_full_store_drops_expired_before_evicting() {
        let mut store = store(1);
        let stale = key(DataSource::Fitbit, 1);
        let fresh = key(DataSource::Fitbit, 2);

        store.set(stale.clone(), expired(DataSource::Fitbit, "stale"));
        store.set(fresh.clone(), entry(DataSource::Fitbit, "fresh"));

        let stats = store.stats();
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.entries, 1);
        assert!(store.has(&fresh));
        assert_eq!(store.keys(), HashSet::from([fresh]));
    }

    #[test]
    fn test_store_full_store_evicts_live_victim_after_sweep() {
        let mut store = store(2);
        let stale = key(DataSource::Fitbit, 1);
        let live = key(DataSource::Fitbit, 2);
        let newest = key(DataSource::Fitbit, 3);
        let overflow = key(DataSource::Fitbit, 4);

        store.set(stale, expired(DataSource::Fitbit, "stale"));
        store.set(live.clone(), entry(DataSource::Fitbit, "live"));
        store.set(newest.clone(), entry(DataSource::Fitbit, "newest"));
        store.set(overflow.clone(), entry(DataSource::Fitbit, "overflow"));

        let stats = store.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.evictions, 1);
        assert!(!store.has(&live));
        assert_eq!(store.keys(), HashSet::from([newest, overflow]));
    }

    #[test]
    fn test_store_invalidate_by_tags() {
        let mut store = store(100);
        let first = key(DataSource::Fitbit, 1);
        let second = key(DataSource::Fitbit, 2);

        store.set(first.clone(), entry(DataSource::Fitbit, "a").with_tags(["user:123"]));
        store.set(second.clone(), entry(DataSource::Fitbit, "b").with_tags(["user:456"]));

        assert_eq!(store.invalidate_by_tags(["user:123"]), 1);
        assert!(!store.has(&first));
        assert!(store.has(&second));

        let stats = store.stats();
        assert_eq!(stats.invalidations, 1);
        assert_eq!(stats.evictions, 0);
    }

    #[test]
    fn test_store_invalidate_by_tags_counts_each_entry_once() {
        let mut store = store(100);
        let k = key(DataSource::Fitbit, 1);

        store.set(k.clone(), entry(DataSource::Fitbit, "a").with_tags(["daily", "user:1"]));

        assert_eq!(store.invalidate_by_tags(["daily", "user:1", "unknown"]), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_replaced_entry_drops_old_tags() {
        let mut store = store(100);
        let k = key(DataSource::Fitbit, 1);

        store.set(k.clone(), entry(DataSource::Fitbit, "a").with_tags(["old", "kept"]));
        store.set(k.clone(), entry(DataSource::Fitbit, "b").with_tags(["kept"]));

        assert_eq!(store.invalidate_by_tags(["old"]), 0);
        assert!(store.has(&k));
        assert_eq!(store.invalidate_by_tags(["kept"]), 1);
    }

    #[test]
    fn test_store_evicted_entry_leaves_tag_index() {
        let mut store = store(1);
        let first = key(DataSource::Fitbit, 1);
        let second = key(DataSource::Fitbit, 2);

        store.set(first, entry(DataSource::Fitbit, "a").with_tags(["user:1"]));
        store.set(second.clone(), entry(DataSource::Fitbit, "b"));

        assert_eq!(store.invalidate_by_tags(["user:1"]), 0);
        assert!(store.has(&second));
    }

    #[test]
    fn test_store_invalidate_by_source() {
        let mut store = store(100);
        let fitbit = key(DataSource::Fitbit, 1);
        let garmin = key(DataSource::Garmin, 1);

        store.set(fitbit.clone(), entry(DataSource::Fitbit, "a"));
        store.set(garmin.clone(), entry(DataSource::Garmin, "b"));

        assert_eq!(store.invalidate_by_source(DataSource::Fitbit), 1);
        assert!(!store.has(&fitbit));
        assert!(store.has(&garmin));
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_clear() {
        let mut store = store(100);

        store.set(key(DataSource::Fitbit, 1), entry(DataSource::Fitbit, "a").with_tags(["t"]));
        store.set(key(DataSource::Oura, 1), entry(DataSource::Oura, "b"));
        store.clear();

        assert!(store.is_empty());
        assert!(store.keys().is_empty());
        assert_eq!(store.invalidate_by_tags(["t"]), 0);
    }

    #[test]
    fn test_store_stats() {
        let mut store = store(100);
        let k = key(DataSource::Fitbit, 1);

        store.set(k.clone(), entry(DataSource::Fitbit, "value1"));
        store.get(&k); // hit
        store.get("nonexistent"); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate, 0.5);
        assert_eq!(stats.entries, 1);
    }
}
