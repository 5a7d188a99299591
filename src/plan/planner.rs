//! Planner：目标 -> 有序步骤
//!
//! 调用 LLM 生成一份简短的检索/行动计划，再用 parse_steps 切分；
//! LLM 失败或返回空文本时，退回一条引用目标本身的合成步骤，保证计划非空。

use std::sync::Arc;

use crate::llm::LlmClient;
use crate::plan::parse::parse_steps;

const PLANNER_SYSTEM_PROMPT: &str = "You are a planning assistant. You turn an objective into a short, ordered list of search or action steps.";

fn planner_prompt(objective: &str) -> String {
    format!(
        "Given the objective, devise a simple step-by-step plan in which each step is a search query or a concrete action. \
Executed in order, the steps must lead to the answer, and the result of the final step should be the final answer. \
Keep the plan as short as possible and skip unnecessary steps.\n\n\
Objective: {}\n\n\
Write each step on its own line as a numbered list.",
        objective
    )
}

/// LLM 不可用时的兜底步骤
pub fn fallback_step(objective: &str) -> String {
    format!("Search for information about: {}", objective)
}

pub struct Planner {
    llm: Arc<dyn LlmClient>,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// 生成计划；总是至少一步
    pub async fn plan(&self, objective: &str) -> Vec<String> {
        match self
            .llm
            .generate(PLANNER_SYSTEM_PROMPT, &planner_prompt(objective))
            .await
        {
            Ok(text) if !text.trim().is_empty() => parse_steps(&text),
            Ok(_) => {
                tracing::warn!("planner returned empty text, using fallback step");
                vec![fallback_step(objective)]
            }
            Err(e) => {
                tracing::warn!(error = %e, "planner call failed, using fallback step");
                vec![fallback_step(objective)]
            }
        }
    }
}
