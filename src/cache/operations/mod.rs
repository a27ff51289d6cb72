/// 缓存操作
pub mod query;
pub mod rate_limit;

pub use query::{QUERY_CACHE_TTL_MS, QueryCache};
pub use rate_limit::{RateLimitCheck, WindowCounter};
