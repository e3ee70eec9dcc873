//! Health Cache - Query-result cache for normalized health data
//!
//! Stores normalized provider results keyed by (source, data type, date
//! range, query parameters) with TTL expiration, LRU eviction and bulk
//! invalidation by source or tag.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use cache::{CacheKey, CacheManager, SetOptions};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use models::{DataSource, DataType, ParamValue};
pub use tasks::spawn_cleanup_task;
