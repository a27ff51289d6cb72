use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::cache::models::CacheEntry;
use crate::cache::store::Store;
use crate::utils::Clock;

/// 查询缓存有效期：5 分钟
pub const QUERY_CACHE_TTL_MS: i64 = 5 * 60 * 1000;

/// 查询签名 → 第一页结果 的限时缓存
///
/// 只有第一页会写入，更深的分页由列表视图在本地累积。
pub struct QueryCache<T> {
    store: Arc<dyn Store<CacheEntry<T>>>,
    clock: Arc<dyn Clock>,
    ttl_ms: i64,
}

impl<T: Clone + Send + 'static> QueryCache<T> {
    pub fn new(store: Arc<dyn Store<CacheEntry<T>>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl_ms: QUERY_CACHE_TTL_MS,
        }
    }

    pub fn with_ttl(mut self, ttl_ms: i64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    /// 返回未过期的条目
    pub fn get(&self, signature: &str) -> Option<CacheEntry<T>> {
        let now = self.clock.now_ms();
        self.store
            .get(signature)
            .filter(|entry| entry.is_fresh(now, self.ttl_ms))
    }

    pub fn put(&self, signature: &str, data: Vec<T>, total: u64) {
        let entry = CacheEntry {
            data,
            total,
            timestamp: self.clock.now_ms(),
        };
        self.store.set(signature, entry);
    }

    pub fn invalidate(&self, signature: &str) -> bool {
        self.store.delete(signature)
    }

    /// 清理所有已过期条目
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_ms();
        let ttl = self.ttl_ms;
        self.store
            .sweep(&|entry: &CacheEntry<T>| entry.is_fresh(now, ttl))
    }
}

impl<T: Clone + Send + Sync + 'static> QueryCache<T> {
    /// 后台定期清理过期条目，调用方持有返回的句柄
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let purged = cache.sweep();
                if purged > 0 {
                    tracing::debug!("query cache sweep purged {} entries", purged);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::InMemoryStore;
    use crate::utils::ManualClock;

    fn cache() -> (QueryCache<u32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        (
            QueryCache::new(Arc::new(InMemoryStore::<CacheEntry<u32>>::new()), clock.clone()),
            clock,
        )
    }

    #[test]
    fn entry_is_served_until_ttl() {
        let (cache, clock) = cache();
        cache.put("sig", vec![1, 2, 3], 10);

        clock.advance(100_000);
        let hit = cache.get("sig").expect("fresh entry");
        assert_eq!(hit.data, vec![1, 2, 3]);
        assert_eq!(hit.total, 10);

        clock.advance(QUERY_CACHE_TTL_MS - 100_000);
        assert!(cache.get("sig").is_none());
    }

    #[test]
    fn invalidate_removes_entry() {
        let (cache, _) = cache();
        cache.put("sig", vec![1], 1);
        assert!(cache.invalidate("sig"));
        assert!(cache.get("sig").is_none());
        assert!(!cache.invalidate("sig"));
    }

    #[test]
    fn sweep_only_removes_expired() {
        let (cache, clock) = cache();
        cache.put("old", vec![1], 1);
        clock.advance(QUERY_CACHE_TTL_MS);
        cache.put("new", vec![2], 1);
        assert_eq!(cache.sweep(), 1);
        assert!(cache.get("new").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_drops_expired_entries() {
        let (cache, clock) = cache();
        let cache = Arc::new(cache);
        cache.put("old", vec![1], 1);
        clock.advance(QUERY_CACHE_TTL_MS);
        cache.put("new", vec![2], 1);

        let handle = cache.spawn_sweeper(Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(cache.invalidate("new"));
        assert!(!cache.invalidate("old"));
        handle.abort();
    }
}
