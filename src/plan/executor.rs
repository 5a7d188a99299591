//! Executor：单个步骤 -> 观察结果
//!
//! 步骤文本原样交给 LLM；配置了 FactLookup 时先检索，再把检索结果并入提示词。
//! 任何失败都转成观察文本返回，不向上抛出。

use std::sync::Arc;

use crate::llm::LlmClient;
use crate::tools::{is_informative, FactLookup};

const EXECUTOR_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Carry out the given task and report the result concisely.";

/// 检索没有结果时放进提示词的占位文本
pub const NO_INFORMATION: &str = "No relevant information found.";

fn grounded_prompt(step: &str, facts: &str) -> String {
    format!(
        "Task: {}\n\nRelevant information:\n{}\n\nUsing the information above where it helps, complete the task and report the result.",
        step, facts
    )
}

/// 提供方错误转成的观察文本
pub fn error_observation(err: impl std::fmt::Display) -> String {
    format!("I encountered an error while processing your query: {}", err)
}

pub struct StepExecutor {
    llm: Arc<dyn LlmClient>,
    lookup: Option<Arc<dyn FactLookup>>,
}

impl StepExecutor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm, lookup: None }
    }

    /// 为步骤执行挂上事实检索
    pub fn with_lookup(mut self, lookup: Arc<dyn FactLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    async fn facts_for(&self, lookup: &dyn FactLookup, step: &str) -> String {
        match lookup.search(step).await {
            Ok(text) if is_informative(&text) => text,
            Ok(_) => {
                tracing::debug!(step = %step, "lookup returned nothing useful");
                NO_INFORMATION.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, step = %step, "fact lookup failed");
                NO_INFORMATION.to_string()
            }
        }
    }

    /// 执行一步并返回观察结果；永不失败
    pub async fn execute(&self, step: &str) -> String {
        let prompt = match &self.lookup {
            Some(lookup) => grounded_prompt(step, &self.facts_for(lookup.as_ref(), step).await),
            None => step.to_string(),
        };

        match self.llm.generate(EXECUTOR_SYSTEM_PROMPT, &prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, step = %step, "step execution failed");
                error_observation(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, MockLlmClient};
    use crate::tools::{LookupError, StaticLookup};

    #[tokio::test]
    async fn test_step_sent_verbatim_without_lookup() {
        let llm = Arc::new(MockLlmClient::scripted(["Paris"]));
        let exec = StepExecutor::new(llm.clone());
        assert_eq!(exec.execute("Find the capital of France").await, "Paris");
        assert_eq!(llm.prompts(), vec!["Find the capital of France"]);
    }

    #[tokio::test]
    async fn test_provider_error_becomes_observation() {
        let llm = Arc::new(MockLlmClient::failing(LlmError::RateLimited));
        let out = StepExecutor::new(llm).execute("anything").await;
        assert!(out.starts_with("I encountered an error while processing your query:"));
        assert!(out.contains("rate limit"));
    }

    #[tokio::test]
    async fn test_lookup_facts_are_included() {
        let llm = Arc::new(MockLlmClient::scripted(["ok"]));
        let lookup = Arc::new(StaticLookup::new(
            "Page: Paris\nSummary: Paris is the capital of France.",
        ));
        let exec = StepExecutor::new(llm.clone()).with_lookup(lookup);
        exec.execute("capital of France").await;
        let prompt = &llm.prompts()[0];
        assert!(prompt.contains("Task: capital of France"));
        assert!(prompt.contains("Paris is the capital of France."));
    }

    #[tokio::test]
    async fn test_near_empty_lookup_is_a_gap() {
        let llm = Arc::new(MockLlmClient::scripted(["ok"]));
        let exec = StepExecutor::new(llm.clone()).with_lookup(Arc::new(StaticLookup::new("n/a")));
        assert_eq!(exec.execute("obscure thing").await, "ok");
        assert!(llm.prompts()[0].contains(NO_INFORMATION));
    }

    struct BrokenLookup;

    #[async_trait::async_trait]
    impl FactLookup for BrokenLookup {
        async fn search(&self, _query: &str) -> Result<String, LookupError> {
            Err(LookupError::Http(503))
        }
    }

    #[tokio::test]
    async fn test_lookup_error_is_not_fatal() {
        let llm = Arc::new(MockLlmClient::scripted(["still answered"]));
        let exec = StepExecutor::new(llm.clone()).with_lookup(Arc::new(BrokenLookup));
        assert_eq!(exec.execute("step").await, "still answered");
        assert!(llm.prompts()[0].contains(NO_INFORMATION));
    }
}
