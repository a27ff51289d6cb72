use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    routing::get,
};
use credit_gate::{
    cache::{InMemoryStore, RateLimitEntry, WindowCounter},
    config::{DEFAULT_RULE, DEFAULT_SESSION_COOKIE_NAME, RateLimitRule, RateLimitRules},
    middleware::{AdmissionController, PageAccess, admission},
    utils::ManualClock,
};
use tower::ServiceExt;

fn app(rules: RateLimitRules) -> (Router, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let store = Arc::new(InMemoryStore::<RateLimitEntry>::new());
    let counter = WindowCounter::new(store, clock.clone());
    let controller = Arc::new(AdmissionController::new(
        counter,
        rules,
        PageAccess::standard("/login"),
        DEFAULT_SESSION_COOKIE_NAME,
    ));

    let router = Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .fallback(|| async { "upstream" })
        .layer(axum::middleware::from_fn_with_state(controller, admission));
    (router, clock)
}

fn api_request(path: &str, session: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(
            header::COOKIE,
            format!("{}={}", DEFAULT_SESSION_COOKIE_NAME, session),
        )
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn denied_request_carries_retry_after_and_error_body() {
    let (app, clock) = app(RateLimitRules::default());

    let first = app
        .clone()
        .oneshot(api_request("/api/v1/oauth/login", "sid"))
        .await
        .expect("response");
    assert_eq!(first.status(), StatusCode::OK);

    clock.advance(1_200);
    let second = app
        .oneshot(api_request("/api/v1/oauth/login", "sid"))
        .await
        .expect("response");

    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(second.headers()[header::RETRY_AFTER], "4");

    let bytes = to_bytes(second.into_body(), 4096).await.expect("body");
    let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body["error_code"], "RATE_LIMITED");
    assert!(body["error_msg"].as_str().unwrap_or_default().contains('4'));
}

#[tokio::test]
async fn sixty_first_request_in_a_second_is_denied() {
    let (app, clock) = app(RateLimitRules::standard(DEFAULT_RULE));

    for _ in 0..60 {
        let response = app
            .clone()
            .oneshot(api_request("/api/v1/balance", "sid"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        clock.advance(15);
    }

    let denied = app
        .clone()
        .oneshot(api_request("/api/v1/balance", "sid"))
        .await
        .expect("response");
    assert_eq!(denied.status(), StatusCode::TOO_MANY_REQUESTS);

    clock.advance(60_000);
    let after_window = app
        .oneshot(api_request("/api/v1/balance", "sid"))
        .await
        .expect("response");
    assert_eq!(after_window.status(), StatusCode::OK);
}

#[tokio::test]
async fn forwarded_for_identifies_cookieless_callers() {
    let rules = RateLimitRules::new(RateLimitRule::new(1, 10_000));
    let (app, _) = app(rules);

    let from = |ip: &str| {
        Request::builder()
            .uri("/api/v1/user/info")
            .header("x-forwarded-for", format!("{}, 10.0.0.1", ip))
            .body(Body::empty())
            .expect("request")
    };

    let a = app.clone().oneshot(from("203.0.113.1")).await.expect("a");
    let b = app.clone().oneshot(from("203.0.113.2")).await.expect("b");
    let a_again = app.oneshot(from("203.0.113.1")).await.expect("a again");

    assert_eq!(a.status(), StatusCode::OK);
    assert_eq!(b.status(), StatusCode::OK);
    assert_eq!(a_again.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn unauthenticated_page_redirects_to_login() {
    let (app, _) = app(RateLimitRules::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/balance?tab=report")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/login?callbackUrl=%2Fbalance%3Ftab%3Dreport"
    );
}

#[tokio::test]
async fn public_pages_and_assets_pass_without_session() {
    let (app, _) = app(RateLimitRules::default());

    for path in ["/", "/login", "/docs/api", "/logo.svg", "/_next/static/app.js", "/healthz"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(path).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK, "{}", path);
    }
}

#[tokio::test]
async fn authenticated_page_is_forwarded() {
    let (app, _) = app(RateLimitRules::default());

    let response = app
        .oneshot(api_request("/merchant", "sid"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), 64).await.expect("body");
    assert_eq!(&bytes[..], b"upstream");
}
