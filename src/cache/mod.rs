//! Cache Module
//!
//! Query-result caching with canonical keys, TTL expiration, LRU eviction
//! and tag/source invalidation.

mod entry;
pub mod key;
mod logger;
mod lru;
mod manager;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use key::{decode, encode, CacheKey};
pub use logger::{CacheLogger, TracingLogger};
#[cfg(test)]
pub(crate) use logger::RecordingLogger;
pub use lru::LruTracker;
pub use manager::{CacheManager, ManagerStats, SetOptions};
pub use stats::CacheStats;
pub use store::MemoryStore;
