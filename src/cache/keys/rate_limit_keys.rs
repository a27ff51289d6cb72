/// 限流计数键：`{标识}:{路径}`，每个端点对每个调用方单独计数
pub fn rate_limit_key(identifier: &str, path: &str) -> String {
    format!("{}:{}", identifier, path)
}
