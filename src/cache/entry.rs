//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::models::{DataSource, DataType};

// == Cache Entry ==
/// A stored query result with its expiry and invalidation metadata.
///
/// The payload is never inspected by the cache. It is shared behind an `Arc`
/// so readers keep a complete value even if the key is replaced afterwards.
#[derive(Debug)]
pub struct CacheEntry<T> {
    /// The stored payload
    pub data: Arc<T>,
    /// When the entry was written
    pub cached_at: DateTime<Utc>,
    /// The entry is stale once `now >= expires_at`
    pub expires_at: DateTime<Utc>,
    /// Provider the payload came from
    pub source: DataSource,
    /// Kind of records in the payload
    pub data_type: DataType,
    /// Labels for bulk invalidation
    pub tags: HashSet<String>,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry that expires `ttl` from now.
    ///
    /// A TTL beyond the representable range saturates to the latest
    /// representable instant.
    pub fn new(data: T, source: DataSource, data_type: DataType, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            data: Arc::new(data),
            cached_at: now,
            expires_at: expiry_after(now, ttl),
            source,
            data_type,
            tags: HashSet::new(),
        }
    }

    /// Attaches invalidation tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Overrides the expiry instant.
    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = expires_at;
        self
    }

    // == Is Expired ==
    /// Checks whether the entry is stale at `now`.
    ///
    /// Boundary condition: an entry expiring exactly at `now` is expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

// == Utility Functions ==
/// Adds `ttl` to `now`, saturating at the maximum representable instant.
fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
