use std::sync::Arc;

use crate::cache::models::RateLimitEntry;
use crate::cache::store::{InMemoryStore, Store};
use crate::utils::{Clock, SystemClock};

/// 单次限流检查结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitCheck {
    pub allowed: bool,
    /// 被拒绝时需等待的秒数，允许时为 0
    pub retry_after_secs: u64,
}

impl RateLimitCheck {
    const ALLOWED: Self = Self {
        allowed: true,
        retry_after_secs: 0,
    };
}

/// 固定窗口计数器
///
/// 窗口过期后的第一个请求把计数重置为 1。被拒绝的请求同样计数，
/// 窗口内的重试不会让调用方更快恢复。窗口交界处最多可通过 `2 × max_requests`
/// 个请求，这是固定窗口 O(1) 内存的代价。
#[derive(Clone)]
pub struct WindowCounter {
    store: Arc<dyn Store<RateLimitEntry>>,
    clock: Arc<dyn Clock>,
}

impl WindowCounter {
    pub fn new(store: Arc<dyn Store<RateLimitEntry>>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// 使用进程内存储和系统时钟
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::<RateLimitEntry>::new()), Arc::new(SystemClock))
    }

    pub fn check(&self, key: &str, max_requests: u32, window_ms: u64) -> RateLimitCheck {
        let now = self.clock.now_ms();

        let entry = self.store.update(key, &mut |current| match current {
            Some(entry) if !entry.is_expired(now, window_ms) => RateLimitEntry {
                count: entry.count.saturating_add(1),
                window_start: entry.window_start,
            },
            _ => RateLimitEntry::fresh(now),
        });

        if entry.count <= max_requests {
            return RateLimitCheck::ALLOWED;
        }

        let window = window_ms as i64;
        let remaining = (window - (now - entry.window_start)).clamp(1, window.max(1));
        RateLimitCheck {
            allowed: false,
            retry_after_secs: (remaining as u64).div_ceil(1000),
        }
    }

    /// 删除窗口起点早于 `now - retention_ms` 的条目，返回删除数量
    pub fn sweep(&self, retention_ms: u64) -> usize {
        let now = self.clock.now_ms();
        let retention = retention_ms as i64;
        self.store
            .sweep(&|entry: &RateLimitEntry| now - entry.window_start <= retention)
    }

    pub fn tracked_keys(&self) -> usize {
        self.store.len()
    }
}
