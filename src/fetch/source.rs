use std::marker::PhantomData;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use reqwest::header::COOKIE;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FetchError;
use crate::fetch::query::{ListQuery, Page};
use crate::result::ApiEnvelope;

/// 交易列表接口路径
pub const TRANSACTIONS_PATH: &str = "/api/v1/order/transactions";

/// 分页查询服务
pub trait PageSource<T>: Send + Sync {
    fn fetch_page(&self, query: ListQuery) -> BoxFuture<'_, Result<Page<T>, FetchError>>;
}

/// 通过 HTTP 调用上游分页接口
pub struct HttpPageSource<T> {
    client: reqwest::Client,
    endpoint: String,
    session: Option<(String, String)>,
    _item: PhantomData<fn() -> T>,
}

impl<T> HttpPageSource<T> {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, base_url, TRANSACTIONS_PATH))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, path: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), path),
            session: None,
            _item: PhantomData,
        }
    }

    /// 以会话 Cookie 身份发起请求
    pub fn with_session(mut self, cookie_name: &str, value: &str) -> Self {
        self.session = Some((cookie_name.to_string(), value.to_string()));
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl<T> PageSource<T> for HttpPageSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn fetch_page(&self, query: ListQuery) -> BoxFuture<'_, Result<Page<T>, FetchError>> {
        async move {
            let mut request = self.client.get(&self.endpoint).query(&query);
            if let Some((name, value)) = &self.session {
                request = request.header(COOKIE, format!("{}={}", name, value));
            }

            let response = request.send().await?;
            let status = response.status();
            debug!("GET {} -> {}", self.endpoint, status);

            if !status.is_success() {
                let message = match response.json::<ApiEnvelope<serde_json::Value>>().await {
                    Ok(envelope) => envelope.error_msg.unwrap_or_default(),
                    Err(_) => String::new(),
                };
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    message,
                });
            }

            let bytes = response.bytes().await?;
            let envelope: ApiEnvelope<Page<T>> =
                serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;

            envelope.data.ok_or_else(|| {
                FetchError::Decode(
                    envelope
                        .error_msg
                        .filter(|msg| !msg.is_empty())
                        .unwrap_or_else(|| "missing data".into()),
                )
            })
        }
        .boxed()
    }
}
