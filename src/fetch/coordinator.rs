use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, error, trace};

use crate::cache::QueryCache;
use crate::cache::keys::list_query_key;
use crate::fetch::query::{DEFAULT_PAGE_SIZE, ListQuery};
use crate::fetch::source::PageSource;
use crate::fetch::state::FetchState;

/// loading 状态至少持续的时长，避免快速响应造成闪烁
pub const MIN_LOADING: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub default_params: ListQuery,
    pub min_loading: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            default_params: ListQuery::default(),
            min_loading: MIN_LOADING,
        }
    }
}

impl FetchOptions {
    fn default_page_size(&self) -> u32 {
        self.default_params
            .page_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

/// 已登记、等待网络结果的一次请求
struct PendingFetch {
    token: u64,
    params: ListQuery,
    query: ListQuery,
    signature: String,
}

/// 列表视图的分页协调器
///
/// 每次 `fetch` 领取一个递增令牌；结果返回时令牌若已不是最新，直接丢弃。
/// 进行中的网络请求不会被取消，只是其结果不再生效。第一页先查 [`QueryCache`]，
/// 更深的分页总是走网络并追加到已有条目之后。
pub struct FetchCoordinator<T> {
    source: Arc<dyn PageSource<T>>,
    cache: Arc<QueryCache<T>>,
    options: FetchOptions,
    state: Mutex<FetchState<T>>,
}

impl<T> FetchCoordinator<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(
        source: Arc<dyn PageSource<T>>,
        cache: Arc<QueryCache<T>>,
        options: FetchOptions,
    ) -> Self {
        let state = FetchState::new(options.default_params.clone(), options.default_page_size());
        Self {
            source,
            cache,
            options,
            state: Mutex::new(state),
        }
    }

    /// 当前状态的副本
    pub fn snapshot(&self) -> FetchState<T> {
        self.state().clone()
    }

    pub async fn fetch(&self, params: ListQuery) {
        let pending = {
            let mut state = self.state();
            self.begin(&mut state, params)
        };
        if let Some(pending) = pending {
            self.complete(pending).await;
        }
    }

    /// 加载下一页；已有请求进行中时什么也不做
    pub async fn load_more(&self) {
        let pending = {
            let mut state = self.state();
            if state.loading {
                trace!("load_more ignored while a page is loading");
                return;
            }
            let params = state.last_params.clone().with_page(state.current_page + 1);
            self.begin(&mut state, params)
        };
        if let Some(pending) = pending {
            self.complete(pending).await;
        }
    }

    /// 丢弃当前查询的第一页缓存后重新请求
    pub async fn refresh(&self) {
        let pending = {
            let mut state = self.state();
            let params = state.last_params.clone().with_page(1);
            let signature = list_query_key(&params.resolved(state.page_size));
            self.cache.invalidate(&signature);
            self.begin(&mut state, params)
        };
        if let Some(pending) = pending {
            self.complete(pending).await;
        }
    }

    /// 回到初始状态，共享缓存保持不变
    pub fn reset(&self) {
        let mut state = self.state();
        state.items.clear();
        state.total = 0;
        state.current_page = 1;
        state.page_size = self.options.default_page_size();
        state.error = None;
        state.last_params = self.options.default_params.clone();
        state.loading = false;
        // 进行中的请求在 reset 之后返回也不得写入
        state.latest_request_token += 1;
    }

    fn state(&self) -> MutexGuard<'_, FetchState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 领取令牌；命中缓存时同步写入并返回 `None`
    fn begin(&self, state: &mut FetchState<T>, params: ListQuery) -> Option<PendingFetch> {
        state.latest_request_token += 1;
        let token = state.latest_request_token;

        let query = params.resolved(state.page_size);
        let signature = list_query_key(&query);

        if query.page() == 1 {
            if let Some(entry) = self.cache.get(&signature) {
                debug!("query cache hit: {}", signature);
                state.items = entry.data;
                state.total = entry.total;
                state.current_page = 1;
                state.page_size = query.page_size.unwrap_or(state.page_size);
                state.last_params = params;
                state.error = None;
                state.loading = false;
                return None;
            }
        }

        state.loading = true;
        state.error = None;
        if query.page() == 1 {
            state.items.clear();
            state.total = 0;
        }

        Some(PendingFetch {
            token,
            params,
            query,
            signature,
        })
    }

    async fn complete(&self, pending: PendingFetch) {
        let (result, ()) = tokio::join!(
            self.source.fetch_page(pending.query.clone()),
            tokio::time::sleep(self.options.min_loading),
        );

        let mut state = self.state();
        if pending.token != state.latest_request_token {
            trace!(
                "dropping response for token {} (latest {})",
                pending.token, state.latest_request_token
            );
            return;
        }

        let requested_page = pending.query.page();
        match result {
            Ok(page) => {
                if requested_page == 1 {
                    self.cache
                        .put(&pending.signature, page.items.clone(), page.total);
                    state.items = page.items;
                } else {
                    state.items.extend(page.items);
                }
                state.total = page.total;
                state.current_page = if page.page > 0 { page.page } else { requested_page };
                if page.page_size > 0 {
                    state.page_size = page.page_size;
                }
                state.last_params = pending.params;
            }
            Err(err) if err.is_cancelled() => {}
            Err(err) => {
                error!("Failed to fetch page {}: {}", requested_page, err);
                state.error = Some(err);
            }
        }
        state.loading = false;
    }
}
