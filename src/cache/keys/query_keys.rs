use crate::fetch::ListQuery;

const ALL: &str = "all";
const NO_START: &str = "no-start";
const NO_END: &str = "no-end";
const NO_ID: &str = "no-id";
const NO_NAME: &str = "no-name";
const NO_PAYER: &str = "no-payer";
const NO_PAYEE: &str = "no-payee";

fn dimension<'a>(value: &'a Option<String>, sentinel: &'a str) -> &'a str {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(sentinel)
}

/// 生成列表查询签名
///
/// 每个维度固定位置，缺省维度用哨兵值占位，因此 "全部类型" 与 "type=X"
/// 永不相撞。`page` 与 `page_size` 取查询中的值，调用方应先做 [`ListQuery::resolved`]。
pub fn list_query_key(query: &ListQuery) -> String {
    let id = match query.id {
        Some(id) if id != 0 => id.to_string(),
        _ => NO_ID.to_string(),
    };

    format!(
        "{}_{}_{}_{}_{}_{}_{}_{}_{}_{}_{}",
        dimension(&query.kind, ALL),
        dimension(&query.status, ALL),
        dimension(&query.client_id, ALL),
        query.page(),
        query.page_size.unwrap_or_default(),
        dimension(&query.start_time, NO_START),
        dimension(&query.end_time, NO_END),
        id,
        dimension(&query.order_name, NO_NAME),
        dimension(&query.payer_username, NO_PAYER),
        dimension(&query.payee_username, NO_PAYEE),
    )
}
