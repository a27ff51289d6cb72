/// 限流规则：窗口内最大请求数与窗口时长
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub max_requests: u32,
    pub window_ms: u64,
}

impl RateLimitRule {
    pub const fn new(max_requests: u32, window_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }
}

/// 默认规则：60 秒内最多 60 次（平均 1 秒 1 次，允许突发）
pub const DEFAULT_RULE: RateLimitRule = RateLimitRule::new(60, 60_000);

/// 路由前缀 → 规则 的静态配置
#[derive(Debug, Clone)]
pub struct RateLimitRules {
    pub rules: Vec<(String, RateLimitRule)>,
    pub default_rule: RateLimitRule,
    /// 永不限流的前缀
    pub exempt_prefixes: Vec<String>,
}

impl RateLimitRules {
    pub fn new(default_rule: RateLimitRule) -> Self {
        Self {
            rules: Vec::new(),
            default_rule,
            exempt_prefixes: Vec::new(),
        }
    }

    /// 线上使用的规则表，敏感接口更严格
    pub fn standard(default_rule: RateLimitRule) -> Self {
        Self::new(default_rule)
            .rule("/api/v1/oauth/login", RateLimitRule::new(1, 5_000))
            .rule("/api/v1/oauth/callback", RateLimitRule::new(1, 5_000))
            .rule("/api/v1/redenvelope", RateLimitRule::new(30, 60_000))
            .exempt("/api/v1/config")
            .exempt("/epay/")
            .exempt("/lpay/")
    }

    pub fn rule(mut self, prefix: impl Into<String>, rule: RateLimitRule) -> Self {
        self.rules.push((prefix.into(), rule));
        self
    }

    pub fn exempt(mut self, prefix: impl Into<String>) -> Self {
        self.exempt_prefixes.push(prefix.into());
        self
    }

    pub fn is_exempt(&self, path: &str) -> bool {
        self.exempt_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// 精确匹配优先，其次最长前缀，最后默认规则
    pub fn resolve(&self, path: &str) -> RateLimitRule {
        if let Some((_, rule)) = self.rules.iter().find(|(prefix, _)| prefix == path) {
            return *rule;
        }

        self.rules
            .iter()
            .filter(|(prefix, _)| path.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, rule)| *rule)
            .unwrap_or(self.default_rule)
    }

    /// 最长窗口，用作清理周期的参考
    pub fn longest_window_ms(&self) -> u64 {
        self.rules
            .iter()
            .map(|(_, rule)| rule.window_ms)
            .fold(self.default_rule.window_ms, u64::max)
    }
}

impl Default for RateLimitRules {
    fn default() -> Self {
        Self::standard(DEFAULT_RULE)
    }
}
