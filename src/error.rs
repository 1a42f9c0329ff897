//! 客户端错误类型
//!
//! 三类错误对应三种处理策略：
//! - Validation：本地校验失败，从不发起网络请求，也从不改动消息日志 / 任务列表
//! - Transport：网络不可达或超时
//! - Service：服务端返回的结构化失败（携带 detail 文案）

use thiserror::Error;

/// 客户端错误（本地校验 / 网络 / 服务端）
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service error: {detail}")]
    Service { detail: String },
}

impl ClientError {
    /// 是否为本地校验错误（未发起网络请求）
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}
