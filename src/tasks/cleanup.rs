//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::cache::CacheManager;

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task sleeps for `interval` between sweeps and returns once the
/// manager has been disposed. The returned handle can also be aborted.
/// Log lines go to the manager's configured logger.
///
/// # Example
/// ```ignore
/// let manager = CacheManager::<Vec<Record>>::new(CacheConfig::default())?;
/// let cleanup_handle = spawn_cleanup_task(manager.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// manager.dispose().await;
/// ```
pub fn spawn_cleanup_task<T>(manager: CacheManager<T>, interval: Duration) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
{
    tokio::spawn(async move {
        manager.logger().info(&format!(
            "ttl cleanup task started (interval={}ms)",
            interval.as_millis()
        ));

        loop {
            tokio::time::sleep(interval).await;

            if manager.is_disposed() {
                manager
                    .logger()
                    .info("cache disposed, stopping ttl cleanup task");
                break;
            }

            let removed = manager.cleanup().await;

            if removed > 0 {
                manager
                    .logger()
                    .info(&format!("ttl cleanup: removed {} expired entries", removed));
            } else {
                manager.logger().debug("ttl cleanup: no expired entries found");
            }
        }
    })
}
