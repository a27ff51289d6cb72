use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use url::form_urlencoded;

/// 页面路由的会话门禁
#[derive(Debug, Clone)]
pub struct PageAccess {
    pub public_routes: Vec<String>,
    pub public_prefixes: Vec<String>,
    pub login_path: String,
}

impl PageAccess {
    pub fn standard(login_path: &str) -> Self {
        Self {
            public_routes: ["/", "/login", "/callback", "/privacy", "/terms"]
                .into_iter()
                .map(String::from)
                .collect(),
            public_prefixes: ["/docs/", "/epay/"].into_iter().map(String::from).collect(),
            login_path: login_path.to_string(),
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_routes.iter().any(|route| route == path)
            || self
                .public_prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// 登录地址，`callbackUrl` 携带原始路径和查询串
    pub fn login_redirect(&self, target: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("callbackUrl", target)
            .finish();
        format!("{}?{}", self.login_path, query)
    }
}

/// 读取会话 Cookie，不校验签名
pub fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|cookie| cookie.value().to_string())
}
