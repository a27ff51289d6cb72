use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub mod rate_limit;

pub use rate_limit::{DEFAULT_RULE, RateLimitRule, RateLimitRules};

pub const DEFAULT_SESSION_COOKIE_NAME: &str = "credit_session_id";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub upstream_url: String,
    pub upstream_timeout_secs: u64,
    pub session_cookie_name: String,
    pub login_path: String,
    pub rate_limit_requests: u32,
    pub rate_limit_window_ms: u64,
    pub rate_limit_retention_ms: u64,
    pub rate_limit_sweep_interval_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let upstream_url = lookup("UPSTREAM_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing("UPSTREAM_URL".into()))?;

        let config = Config {
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: parse_or(&lookup, "SERVER_PORT", 3000)?,
            upstream_url: upstream_url.trim_end_matches('/').to_string(),
            upstream_timeout_secs: parse_or(&lookup, "UPSTREAM_TIMEOUT_SECS", 30)?,
            session_cookie_name: lookup("SESSION_COOKIE_NAME")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_SESSION_COOKIE_NAME.into()),
            login_path: lookup("LOGIN_PATH").unwrap_or_else(|| "/login".into()),
            rate_limit_requests: parse_positive(
                &lookup,
                "RATE_LIMIT_REQUESTS",
                DEFAULT_RULE.max_requests,
            )?,
            rate_limit_window_ms: parse_positive(
                &lookup,
                "RATE_LIMIT_WINDOW_MS",
                DEFAULT_RULE.window_ms,
            )?,
            rate_limit_retention_ms: parse_positive(&lookup, "RATE_LIMIT_RETENTION_MS", 120_000)?,
            rate_limit_sweep_interval_ms: parse_positive(
                &lookup,
                "RATE_LIMIT_SWEEP_INTERVAL_MS",
                60_000,
            )?,
        };

        Ok(config)
    }

    pub fn rate_limit_rules(&self) -> RateLimitRules {
        RateLimitRules::standard(RateLimitRule::new(
            self.rate_limit_requests,
            self.rate_limit_window_ms,
        ))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.rate_limit_sweep_interval_ms)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

fn parse_positive<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default,
{
    let value = parse_or(lookup, key, default)?;
    if value <= T::default() {
        return Err(ConfigError::Invalid {
            var: key.to_string(),
            value: lookup(key).unwrap_or_default(),
        });
    }
    Ok(value)
}
