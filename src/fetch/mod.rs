// 客户端列表层：查询参数、分页服务接入、分页协调

pub mod coordinator;
pub mod query;
pub mod source;
pub mod state;

pub use coordinator::{FetchCoordinator, FetchOptions, MIN_LOADING};
pub use query::{DEFAULT_PAGE_SIZE, ListQuery, Order, Page};
pub use source::{HttpPageSource, PageSource, TRANSACTIONS_PATH};
pub use state::{FetchPhase, FetchState};
