use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

use crate::cache::WindowCounter;
use crate::cache::keys::rate_limit_key;
use crate::config::{Config, RateLimitRules};
use crate::error::AppError;
use crate::middleware::auth::{PageAccess, session_cookie};
use crate::middleware::rate_limit::client_identifier;

/// API 命名空间
pub const API_PREFIX: &str = "/api/";

const INTERNAL_PREFIXES: [&str; 1] = ["/_next/"];
const INTERNAL_PATHS: [&str; 4] = ["/favicon.ico", "/robots.txt", "/sitemap.xml", "/healthz"];
const STATIC_EXTENSIONS: [&str; 7] = [".jpg", ".jpeg", ".gif", ".png", ".svg", ".ico", ".webp"];

/// 框架内部路径与静态资源不经过准入判断
pub fn is_excluded_path(path: &str) -> bool {
    if INTERNAL_PATHS.contains(&path)
        || INTERNAL_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
    {
        return true;
    }
    let lower = path.to_ascii_lowercase();
    STATIC_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// 准入结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// 超出预算，等待后可重试
    Deny { retry_after_secs: u64 },
    /// 未登录的页面请求，`target` 为原始路径加查询串
    RedirectToLogin { target: String },
}

/// 边缘准入控制：API 请求限流，页面请求校验会话是否存在
pub struct AdmissionController {
    counter: WindowCounter,
    rules: RateLimitRules,
    pages: PageAccess,
    session_cookie_name: String,
}

impl AdmissionController {
    pub fn new(
        counter: WindowCounter,
        rules: RateLimitRules,
        pages: PageAccess,
        session_cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            counter,
            rules,
            pages,
            session_cookie_name: session_cookie_name.into(),
        }
    }

    pub fn from_config(config: &Config, counter: WindowCounter) -> Self {
        Self::new(
            counter,
            config.rate_limit_rules(),
            PageAccess::standard(&config.login_path),
            config.session_cookie_name.clone(),
        )
    }

    pub fn rules(&self) -> &RateLimitRules {
        &self.rules
    }

    pub fn decide(&self, uri: &Uri, headers: &HeaderMap) -> Decision {
        let path = uri.path();
        let is_api = path.starts_with(API_PREFIX);
        // 静态资源豁免只针对页面路由，API 路径一律限流
        if !is_api && is_excluded_path(path) {
            return Decision::Allow;
        }

        let session = session_cookie(headers, &self.session_cookie_name);

        if is_api {
            if self.rules.is_exempt(path) {
                return Decision::Allow;
            }

            let rule = self.rules.resolve(path);
            let identifier = client_identifier(headers, session.as_deref());
            let check = self.counter.check(
                &rate_limit_key(&identifier, path),
                rule.max_requests,
                rule.window_ms,
            );

            if !check.allowed {
                warn!(
                    "Rate limited {} on {}, retry after {}s",
                    identifier, path, check.retry_after_secs
                );
                return Decision::Deny {
                    retry_after_secs: check.retry_after_secs,
                };
            }
            return Decision::Allow;
        }

        if self.pages.is_public(path) || session.is_some() {
            return Decision::Allow;
        }

        let target = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| path.to_string());
        debug!("No session for {}, redirecting to login", target);
        Decision::RedirectToLogin { target }
    }

    pub async fn admit(self: Arc<Self>, req: Request<Body>, next: Next) -> Response {
        match self.decide(req.uri(), req.headers()) {
            Decision::Allow => next.run(req).await,
            Decision::Deny { retry_after_secs } => {
                AppError::RateLimited { retry_after_secs }.into_response()
            }
            Decision::RedirectToLogin { target } => {
                Redirect::temporary(&self.pages.login_redirect(&target)).into_response()
            }
        }
    }
}

pub async fn admission(
    State(controller): State<Arc<AdmissionController>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    controller.admit(req, next).await
}
