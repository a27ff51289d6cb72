/// 缓存键模块
pub mod query_keys;
pub mod rate_limit_keys;

pub use query_keys::list_query_key;
pub use rate_limit_keys::rate_limit_key;
