use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use credit_gate::{
    cache::{CacheEntry, InMemoryStore, QueryCache},
    error::FetchError,
    fetch::{
        FetchCoordinator, FetchOptions, FetchPhase, HttpPageSource, ListQuery, Order,
        TRANSACTIONS_PATH,
    },
    utils::ManualClock,
};
use serde_json::json;

#[derive(Clone, Default)]
struct Backend {
    requests: Arc<Mutex<Vec<(HashMap<String, String>, Option<String>)>>>,
    fail: bool,
}

impl Backend {
    fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

fn order(n: u32) -> serde_json::Value {
    json!({
        "order_no": format!("ORD{:04}", n),
        "order_name": "transfer",
        "merchant_order_no": null,
        "payer_username": "alice",
        "payee_username": "bob",
        "amount": "10.00",
        "status": "success",
        "type": "receive",
        "trade_time": "2025-06-01T12:00:00+08:00",
        "created_at": "2025-06-01T12:00:00+08:00"
    })
}

async fn transactions(
    State(backend): State<Backend>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    backend.requests.lock().unwrap().push((params.clone(), cookie));

    if backend.fail {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error_msg": "数据库不可用", "data": null })),
        );
    }

    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let size: u32 = params
        .get("page_size")
        .and_then(|p| p.parse().ok())
        .unwrap_or(20);
    let total = 25u32;
    let start = (page - 1) * size;
    let end = (start + size).min(total);
    let items: Vec<_> = (start..end).map(order).collect();

    (
        StatusCode::OK,
        Json(json!({
            "error_msg": "",
            "data": {
                "items": items,
                "page": page,
                "page_size": size,
                "total": total,
                "total_pages": total.div_ceil(size),
            }
        })),
    )
}

async fn serve(backend: Backend) -> String {
    let app = Router::new()
        .route(TRANSACTIONS_PATH, get(transactions))
        .with_state(backend);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{}", addr)
}

fn coordinator(base_url: &str, clock: Arc<ManualClock>) -> FetchCoordinator<Order> {
    let source: HttpPageSource<Order> = HttpPageSource::new(base_url, Duration::from_secs(5))
        .expect("client")
        .with_session("credit_session_id", "sid-42");
    let store = Arc::new(InMemoryStore::<CacheEntry<Order>>::new());
    let cache = Arc::new(QueryCache::new(store, clock));
    FetchCoordinator::new(
        Arc::new(source),
        cache,
        FetchOptions {
            default_params: ListQuery {
                page_size: Some(20),
                ..Default::default()
            },
            min_loading: Duration::from_millis(5),
        },
    )
}

fn receive() -> ListQuery {
    ListQuery {
        kind: Some("receive".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn pages_accumulate_over_http() {
    let backend = Backend::default();
    let base = serve(backend.clone()).await;
    let coordinator = coordinator(&base, Arc::new(ManualClock::new(0)));

    coordinator.fetch(receive()).await;
    let first = coordinator.snapshot();
    assert_eq!(first.items.len(), 20);
    assert_eq!(first.total, 25);
    assert_eq!(first.total_pages(), 2);
    assert_eq!(first.phase(), FetchPhase::Success);

    coordinator.load_more().await;
    let second = coordinator.snapshot();
    assert_eq!(second.items.len(), 25);
    assert_eq!(second.items[20].order_no, "ORD0020");
    assert_eq!(second.current_page, 2);

    let requests = backend.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    let (params, cookie) = &requests[0];
    assert_eq!(params.get("type").map(String::as_str), Some("receive"));
    assert_eq!(params.get("page").map(String::as_str), Some("1"));
    assert_eq!(params.get("page_size").map(String::as_str), Some("20"));
    assert_eq!(cookie.as_deref(), Some("credit_session_id=sid-42"));
    assert_eq!(requests[1].0.get("page").map(String::as_str), Some("2"));
}

#[tokio::test]
async fn identical_query_within_ttl_is_served_from_cache() {
    let backend = Backend::default();
    let base = serve(backend.clone()).await;
    let clock = Arc::new(ManualClock::new(0));
    let coordinator = coordinator(&base, clock.clone());

    coordinator.fetch(receive()).await;
    let first = coordinator.snapshot().items;

    clock.advance(100_000);
    coordinator.fetch(receive()).await;
    assert_eq!(backend.hits(), 1);
    assert_eq!(coordinator.snapshot().items, first);

    coordinator.refresh().await;
    assert_eq!(backend.hits(), 2);
}

#[tokio::test]
async fn server_error_is_surfaced_with_message() {
    let backend = Backend {
        fail: true,
        ..Default::default()
    };
    let base = serve(backend.clone()).await;
    let coordinator = coordinator(&base, Arc::new(ManualClock::new(0)));

    coordinator.fetch(receive()).await;

    let state = coordinator.snapshot();
    assert_eq!(
        state.error,
        Some(FetchError::Status {
            status: 500,
            message: "数据库不可用".into()
        })
    );
    assert!(state.items.is_empty());
    assert!(!state.loading);

    // 失败结果不写入缓存，再次请求仍走网络
    coordinator.fetch(receive()).await;
    assert_eq!(backend.hits(), 2);
}
