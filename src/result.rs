use serde::{Deserialize, Serialize};

/// 网关自身接口的响应结构
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 0 表示成功
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resp_data: Option<T>,
}

/// 上游业务接口的响应信封：`{ error_msg, data }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub error_msg: Option<String>,
    pub data: Option<T>,
}

/// 错误响应体：`{ error_code, error_msg }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error_code: String,
    pub error_msg: String,
}

impl ErrorBody {
    pub fn new(error_code: &str, error_msg: impl Into<String>) -> Self {
        Self {
            error_code: error_code.to_string(),
            error_msg: error_msg.into(),
        }
    }
}
