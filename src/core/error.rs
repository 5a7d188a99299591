//! 应用级错误类型
//!
//! 编排核心内部的失败（LLM、检索）都在组件边界被吸收为文本；AgentError 只用于
//! 装配期的用量文件读写。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Usage store error: {0}")]
    Usage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
