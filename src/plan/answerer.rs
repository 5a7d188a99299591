//! Answerer：不经规划直接回答，作为编排循环的兜底

use std::sync::Arc;

use crate::llm::LlmClient;
use crate::plan::replanner::error_response;

const ANSWERER_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Answer the user's question directly and accurately.";

/// 提供方返回空文本时的回复
pub const EMPTY_ANSWER: &str = "No response generated.";

pub struct Answerer {
    llm: Arc<dyn LlmClient>,
}

impl Answerer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// 单次问答；返回值永不为空
    pub async fn answer(&self, query: &str) -> String {
        match self.llm.generate(ANSWERER_SYSTEM_PROMPT, query).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => EMPTY_ANSWER.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "answerer call failed");
                error_response(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, MockLlmClient};

    #[tokio::test]
    async fn test_answer_passes_query_through() {
        let llm = Arc::new(MockLlmClient::scripted(["42"]));
        let answerer = Answerer::new(llm.clone());
        assert_eq!(answerer.answer("meaning of life").await, "42");
        assert_eq!(llm.prompts(), vec!["meaning of life"]);
    }

    #[tokio::test]
    async fn test_empty_completion_is_replaced() {
        let llm = Arc::new(MockLlmClient::scripted([" \n "]));
        assert_eq!(Answerer::new(llm).answer("q").await, EMPTY_ANSWER);
    }

    #[tokio::test]
    async fn test_error_is_described() {
        let llm = Arc::new(MockLlmClient::failing(LlmError::Transport("refused".into())));
        let out = Answerer::new(llm).answer("q").await;
        assert!(out.contains("refused"));
    }
}
