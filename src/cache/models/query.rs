use serde::{Deserialize, Serialize};

/// 第一页查询结果的缓存条目
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub data: Vec<T>,
    pub total: u64,
    /// 写入时间（毫秒）
    pub timestamp: i64,
}

impl<T> CacheEntry<T> {
    pub fn is_fresh(&self, now: i64, ttl_ms: i64) -> bool {
        now - self.timestamp < ttl_ms
    }
}
