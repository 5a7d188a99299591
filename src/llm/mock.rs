//! Mock LLM 客户端（用于测试与无 API Key 的本地运行）
//!
//! 默认回显最后一条 User 消息；也可按脚本依次返回预设结果，脚本耗尽后重复兜底结果，
//! 便于构造「永远失败」「永远返回同一计划」等场景。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError, Message, Role};

/// 脚本耗尽后的行为
#[derive(Debug, Clone)]
enum Fallback {
    /// 回显最后一条 User 消息
    Echo,
    /// 重复同一结果
    Repeat(Result<String, LlmError>),
}

/// Mock 客户端：记录每次调用的 user prompt，按脚本或兜底规则返回
#[derive(Debug)]
pub struct MockLlmClient {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    fallback: Fallback,
    prompts: Mutex<Vec<String>>,
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::echo()
    }
}

impl MockLlmClient {
    /// 回显模式
    pub fn echo() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Fallback::Echo,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// 依次返回给定文本；耗尽后重复最后一条（空脚本时回显）
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_results(responses.into_iter().map(|s| Ok(s.into())))
    }

    /// 依次返回给定结果（可含错误）；耗尽后重复最后一条
    pub fn with_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<String, LlmError>>,
    {
        let script: VecDeque<_> = results.into_iter().collect();
        let fallback = script
            .back()
            .cloned()
            .map(Fallback::Repeat)
            .unwrap_or(Fallback::Echo);
        Self {
            script: Mutex::new(script),
            fallback,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// 每次都返回同一文本
    pub fn repeating(text: impl Into<String>) -> Self {
        Self::with_results([Ok(text.into())])
    }

    /// 每次都失败
    pub fn failing(err: LlmError) -> Self {
        Self::with_results([Err(err)])
    }

    /// 已收到的调用次数
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// 每次调用的最后一条 User 消息（按调用顺序）
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.clone())
            .unwrap_or_else(|| "(no input)".to_string());

        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(last_user.clone());

        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match next {
            Some(result) => result,
            None => match &self.fallback {
                Fallback::Echo => Ok(format!("Echo from Mock: {}", last_user)),
                Fallback::Repeat(result) => result.clone(),
            },
        }
    }
}
