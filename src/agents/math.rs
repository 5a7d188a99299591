//! Math Agent：逐步推理并给出结论

use std::sync::Arc;

use crate::llm::LlmClient;

const MATH_SYSTEM_PROMPT: &str = "You are a math expert. Solve the given math problem step by step. \
Show your work clearly, then give the final answer as short bullet points.";

pub struct MathAgent {
    llm: Arc<dyn LlmClient>,
}

impl MathAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn solve(&self, problem: &str) -> String {
        match self.llm.generate(MATH_SYSTEM_PROMPT, problem).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "math agent failed");
                format!("Error: {}", e)
            }
        }
    }
}
