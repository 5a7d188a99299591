//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / OpenRouter / DeepSeek / Mock）实现 LlmClient：complete 返回整段文本。
//! 失败统一为 LlmError，由各组件在边界处转为可读文本，不向外传播。

use async_trait::async_trait;
use thiserror::Error;

use crate::llm::Message;

/// 补全服务的失败类型（网络、超时、限流、服务端错误）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("rate limited by provider")]
    RateLimited,

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("empty completion")]
    EmptyResponse,
}

impl LlmError {
    /// 根据错误文本粗略归类（async_openai 的错误只暴露可读消息）
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("rate limit") || lower.contains("429") {
            LlmError::RateLimited
        } else if lower.contains("401") || lower.contains("api key") || lower.contains("unauthorized") {
            LlmError::Auth(message)
        } else if lower.contains("error sending request") || lower.contains("connection") {
            LlmError::Transport(message)
        } else {
            LlmError::Provider(message)
        }
    }
}

/// LLM 客户端 trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;

    /// system + user 两条消息的单轮生成
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        let messages = [Message::system(system_prompt), Message::user(user_prompt)];
        self.complete(&messages).await
    }
}
