// 搜索客户端配置错误类型定义

use thiserror::Error;

/// 配置加载与校验错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("无效的服务器地址: {0}")]
    InvalidUrl(String),

    #[error("无效的配置值 {key}: {value}")]
    InvalidValue { key: String, value: String },
}
