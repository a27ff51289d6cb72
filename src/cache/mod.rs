// 缓存模块
// 进程内存储、存储的数据结构、键生成以及在其上的操作

pub mod keys;
pub mod models;
pub mod operations;
pub mod store;

pub use models::{CacheEntry, RateLimitEntry};
pub use operations::{QUERY_CACHE_TTL_MS, QueryCache, RateLimitCheck, WindowCounter};
pub use store::{InMemoryStore, Store};
