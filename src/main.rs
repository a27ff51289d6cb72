use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{Router, routing::get};
use credit_gate::{
    AppState,
    cache::WindowCounter,
    config::Config,
    middleware::{AdmissionController, admission, log_errors, spawn_sweeper},
    routes::{self, Upstream},
};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    let upstream = Upstream::new(&config.upstream_url, config.upstream_timeout())
        .expect("Failed to create upstream client");

    let state = AppState {
        config: config.clone(),
        upstream: Arc::new(upstream),
    };

    // 限流计数器只在本进程内有效，多实例部署时各自计数
    let counter = WindowCounter::in_memory();
    let controller = Arc::new(AdmissionController::from_config(&config, counter.clone()));
    spawn_sweeper(
        counter,
        config.sweep_interval(),
        config.rate_limit_retention_ms,
    );
    tracing::info!(
        "Rate limiting {} prefixed rules, default {}/{}ms, longest window {}ms",
        controller.rules().rules.len(),
        controller.rules().default_rule.max_requests,
        controller.rules().default_rule.window_ms,
        controller.rules().longest_window_ms()
    );

    let router = Router::new()
        .route("/healthz", get(routes::health::ping))
        .fallback(routes::forward)
        .layer(axum::middleware::from_fn(log_errors))
        .layer(axum::middleware::from_fn_with_state(controller, admission));

    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(CorsLayer::permissive())
    };

    let app = router.with_state(state.clone());

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}, forwarding to {}", addr, state.config.upstream_url);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
