use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// 交易列表查询参数，所有维度均可缺省
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(rename = "startTime", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(rename = "endTime", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee_username: Option<String>,
}

impl ListQuery {
    /// 页码，缺省为 1
    pub fn page(&self) -> u32 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// 补全页码和每页数量
    pub fn resolved(&self, fallback_page_size: u32) -> Self {
        let mut query = self.clone();
        query.page = Some(self.page());
        query.page_size = Some(
            self.page_size
                .filter(|size| *size > 0)
                .unwrap_or(fallback_page_size),
        );
        query
    }
}

/// 分页查询服务的响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(alias = "orders")]
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

/// 交易订单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_no: String,
    pub order_name: String,
    #[serde(default)]
    pub merchant_order_no: Option<String>,
    pub payer_username: String,
    pub payee_username: String,
    /// 金额，十进制字符串
    pub amount: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub trade_time: Option<String>,
    pub created_at: String,
}
