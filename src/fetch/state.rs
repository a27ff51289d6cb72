use crate::error::FetchError;
use crate::fetch::query::ListQuery;

/// 列表视图所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    Loading,
    Success,
    Error,
}

/// 一个列表视图的分页状态
#[derive(Debug, Clone)]
pub struct FetchState<T> {
    /// 跨页累积的条目
    pub items: Vec<T>,
    pub total: u64,
    pub current_page: u32,
    pub page_size: u32,
    pub loading: bool,
    pub error: Option<FetchError>,
    pub last_params: ListQuery,
    /// 最近一次发起的请求令牌，只有持有该令牌的响应可以写入状态
    pub latest_request_token: u64,
}

impl<T> FetchState<T> {
    pub fn new(default_params: ListQuery, page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            current_page: 1,
            page_size,
            loading: false,
            error: None,
            last_params: default_params,
            latest_request_token: 0,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size))
    }

    pub fn phase(&self) -> FetchPhase {
        if self.loading {
            FetchPhase::Loading
        } else if self.error.is_some() {
            FetchPhase::Error
        } else if self.latest_request_token == 0 {
            FetchPhase::Idle
        } else {
            FetchPhase::Success
        }
    }
}
