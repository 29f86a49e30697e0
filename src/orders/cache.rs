use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::types::Order;

const ACTIVE_ORDERS_KEY: &str = "orders:active";

/// Time-boxed snapshot of the active-orders query.
///
/// Expiry is checked when the snapshot is read; nothing runs in the
/// background. Cloning shares the same underlying cache.
///
/// Every invalidation bumps a generation counter. A snapshot loaded under
/// an older generation is discarded, so a read racing a local edit cannot
/// put pre-edit data back into the cache.
#[derive(Debug, Clone)]
pub struct RefreshCache {
    cache: Option<Cache<&'static str, Arc<Vec<Order>>>>,
    generation: Arc<AtomicU64>,
}

impl RefreshCache {
    /// `None` disables caching: every read goes to the store
    pub fn new(ttl: Option<Duration>) -> Self {
        let cache = ttl.map(|ttl| Cache::builder().time_to_live(ttl).build());
        Self {
            cache,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Snapshot still inside its time-to-live window, if any
    pub async fn get(&self) -> Option<Arc<Vec<Order>>> {
        let cache = self.cache.as_ref()?;
        let snapshot = cache.get(ACTIVE_ORDERS_KEY).await;
        debug!(hit = snapshot.is_some(), "Board cache lookup");
        snapshot
    }

    /// Take before querying the store and hand back to [`store`](Self::store)
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Keep `orders` unless the cache was invalidated since `generation`
    pub async fn store(&self, orders: Arc<Vec<Order>>, generation: u64) {
        let Some(cache) = &self.cache else {
            return;
        };
        // insert first, then re-check: an invalidation landing in between
        // is caught by one of the two sides
        cache.insert(ACTIVE_ORDERS_KEY, orders).await;
        if self.generation() != generation {
            cache.invalidate(ACTIVE_ORDERS_KEY).await;
            debug!("Discarded board snapshot loaded before an invalidation");
        }
    }

    /// Drop the snapshot so the next read re-queries the store
    pub async fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(cache) = &self.cache {
            cache.invalidate(ACTIVE_ORDERS_KEY).await;
            debug!("Board cache invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(len: usize) -> Arc<Vec<Order>> {
        let order = Order {
            order_number: "1".to_string(),
            plate: "ABC1234".to_string(),
            customer: "Fleet Co".to_string(),
            status: "executing".to_string(),
            scheduled_completion: None,
            note: None,
            created_at: chrono::NaiveDateTime::default(),
            last_modified_at: chrono::NaiveDateTime::default(),
            completed_at: None,
            same_day_departure: false,
        };
        Arc::new(vec![order; len])
    }

    #[tokio::test]
    async fn test_snapshot_served_within_ttl() {
        let cache = RefreshCache::new(Some(Duration::from_secs(60)));
        assert!(cache.get().await.is_none());

        cache.store(snapshot(2), cache.generation()).await;
        assert_eq!(cache.get().await.map(|s| s.len()), Some(2));
    }

    #[tokio::test]
    async fn test_snapshot_expires() {
        let cache = RefreshCache::new(Some(Duration::from_millis(100)));
        cache.store(snapshot(1), cache.generation()).await;
        assert!(cache.get().await.is_some());

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_drops_snapshot() {
        let cache = RefreshCache::new(Some(Duration::from_secs(60)));
        cache.store(snapshot(3), cache.generation()).await;
        cache.invalidate().await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_from_before_invalidation_is_discarded() {
        let cache = RefreshCache::new(Some(Duration::from_secs(60)));
        let generation = cache.generation();

        // a local edit lands while the board query is still running
        cache.invalidate().await;
        cache.store(snapshot(5), generation).await;

        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_cache_never_holds_data() {
        let cache = RefreshCache::new(None);
        assert!(!cache.is_enabled());
        cache.store(snapshot(1), cache.generation()).await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_snapshot() {
        let cache = RefreshCache::new(Some(Duration::from_secs(60)));
        let other_handle = cache.clone();
        cache.store(snapshot(4), cache.generation()).await;
        assert_eq!(other_handle.get().await.map(|s| s.len()), Some(4));
    }
}
