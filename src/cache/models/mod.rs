/// 缓存数据模型
pub mod query;
pub mod rate_limit;

pub use query::CacheEntry;
pub use rate_limit::RateLimitEntry;
