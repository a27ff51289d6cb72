use serde::{Deserialize, Serialize};

/// 限流计数条目，按 (标识, 路径) 懒创建
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// 当前窗口内请求数
    pub count: u32,
    /// 窗口开始时间（毫秒）
    pub window_start: i64,
}

impl RateLimitEntry {
    pub fn fresh(now: i64) -> Self {
        Self {
            count: 1,
            window_start: now,
        }
    }

    pub fn is_expired(&self, now: i64, window_ms: u64) -> bool {
        now - self.window_start >= window_ms as i64
    }
}
