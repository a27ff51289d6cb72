use axum::Json;
use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::result::ErrorBody;
use crate::utils::error_codes;

/// 边缘层返回给调用方的错误
#[derive(Debug)]
pub enum AppError {
    /// 超出限流预算，等待 `retry_after_secs` 后可重试
    RateLimited { retry_after_secs: u64 },
    UpstreamUnavailable(String),
    InternalServerError,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::RateLimited { retry_after_secs } => {
                let body = Json(ErrorBody::new(
                    error_codes::RATE_LIMITED,
                    format!("请求过于频繁，请 {} 秒后重试", retry_after_secs),
                ));
                let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                response
            }
            AppError::UpstreamUnavailable(reason) => (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody::new(
                    error_codes::UPSTREAM_UNAVAILABLE,
                    format!("上游服务不可用: {}", reason),
                )),
            )
                .into_response(),
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new(error_codes::INTERNAL_ERROR, "内部服务器错误")),
            )
                .into_response(),
        }
    }
}

/// 分页查询失败的原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// 请求被调用方取消，不视为失败
    #[error("请求已被取消")]
    Cancelled,
    #[error("网络请求失败: {0}")]
    Transport(String),
    #[error("服务端返回 {status}: {message}")]
    Status { status: u16, message: String },
    #[error("响应解析失败: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(String),
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: String, value: String },
}
