use std::time::Duration;

use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use tokio::task::JoinHandle;

use crate::cache::WindowCounter;

/// 无法识别调用方时共用的桶
pub const ANONYMOUS: &str = "anonymous";

/// 会话值的摘要，避免原始会话 ID 出现在计数键和日志中
pub fn fingerprint(value: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(value.as_bytes()));
    digest[..32].to_string()
}

/// 限流标识：会话 Cookie → x-forwarded-for 第一项 → x-real-ip → "anonymous"
pub fn client_identifier(headers: &HeaderMap, session: Option<&str>) -> String {
    if let Some(session) = session.filter(|s| !s.is_empty()) {
        return format!("session:{}", fingerprint(session));
    }

    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(ANONYMOUS)
        .to_string()
}

/// 定期清理过期计数条目，与请求流量无关
pub fn spawn_sweeper(counter: WindowCounter, every: Duration, retention_ms: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // 第一次 tick 立即返回
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let purged = counter.sweep(retention_ms);
            tracing::debug!(
                "rate limit sweep purged {} entries, {} remain",
                purged,
                counter.tracked_keys()
            );
        }
    })
}
