//! Replanner：根据目标、剩余计划与全部执行记录，决定结束还是给出新的剩余计划
//!
//! 每轮都传入完整的剩余计划和完整历史，而不是增量。
//! 输出分类：短（少于 3 行且少于 500 字符）视为最终答案，否则按计划格式重新解析。

use std::sync::Arc;

use serde::Serialize;

use crate::llm::LlmClient;
use crate::plan::parse::{format_history, format_plan, is_final_answer, parse_steps};
use crate::plan::StepRecord;

const REPLANNER_SYSTEM_PROMPT: &str =
    "You are a planning assistant that reviews progress toward an objective and decides what to do next.";

fn replanner_prompt(objective: &str, plan: &[String], history: &[StepRecord]) -> String {
    let remaining = if plan.is_empty() {
        "(none)".to_string()
    } else {
        format_plan(plan)
    };
    format!(
        "Objective: {}\n\n\
Remaining plan:\n{}\n\n\
Steps completed so far:\n{}\n\n\
If the objective has been achieved, reply with the final answer for the user and nothing else. \
Otherwise reply with the revised list of remaining steps, one per line as a numbered list. \
Do not repeat steps that are already done.",
        objective,
        remaining,
        format_history(history)
    )
}

/// 重规划结论：二者必居其一
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ReplanDecision {
    /// 替换剩余计划
    UpdatedPlan(Vec<String>),
    /// 结束循环
    FinalResponse(String),
}

impl ReplanDecision {
    /// 按长度启发式对 LLM 原始输出分类
    pub fn classify(response: &str) -> Self {
        if is_final_answer(response) {
            ReplanDecision::FinalResponse(response.trim().to_string())
        } else {
            ReplanDecision::UpdatedPlan(parse_steps(response))
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, ReplanDecision::FinalResponse(_))
    }
}

/// 提供方错误时的最终回复
pub fn error_response(err: impl std::fmt::Display) -> String {
    format!("I encountered an error while processing your request: {}", err)
}

pub struct Replanner {
    llm: Arc<dyn LlmClient>,
}

impl Replanner {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// 决定下一步；永不失败
    pub async fn replan(
        &self,
        objective: &str,
        plan: &[String],
        history: &[StepRecord],
    ) -> ReplanDecision {
        let prompt = replanner_prompt(objective, plan, history);
        match self.llm.generate(REPLANNER_SYSTEM_PROMPT, &prompt).await {
            Ok(text) => ReplanDecision::classify(&text),
            Err(e) => {
                tracing::warn!(error = %e, "replanner call failed, ending loop");
                ReplanDecision::FinalResponse(error_response(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, MockLlmClient};

    #[test]
    fn test_short_reply_is_final() {
        let d = ReplanDecision::classify("Paris; 15% of 2,175,601 is 326,340.\n");
        assert_eq!(
            d,
            ReplanDecision::FinalResponse("Paris; 15% of 2,175,601 is 326,340.".into())
        );
    }

    #[test]
    fn test_long_reply_is_plan() {
        let d = ReplanDecision::classify("Remaining steps:\n1. Look up population\n2. Compute 15%");
        assert_eq!(
            d,
            ReplanDecision::UpdatedPlan(vec!["Look up population".into(), "Compute 15%".into()])
        );
    }

    #[test]
    fn test_long_single_line_is_plan() {
        let text = "y".repeat(600);
        match ReplanDecision::classify(&text) {
            ReplanDecision::UpdatedPlan(steps) => assert_eq!(steps, vec![text]),
            other => panic!("expected plan, got {:?}", other),
        }
    }

    #[test]
    fn test_decision_serializes_tagged() {
        let json = serde_json::to_value(ReplanDecision::FinalResponse("done".into())).unwrap();
        assert_eq!(json["type"], "final_response");
        assert_eq!(json["value"], "done");
    }

    #[tokio::test]
    async fn test_prompt_carries_full_state() {
        let llm = Arc::new(MockLlmClient::scripted(["done"]));
        let replanner = Replanner::new(llm.clone());
        let history = vec![StepRecord::new("find capital", "Paris")];
        let plan = vec!["find population".to_string()];
        let d = replanner.replan("capital and population", &plan, &history).await;
        assert!(d.is_final());

        let prompt = &llm.prompts()[0];
        assert!(prompt.contains("Objective: capital and population"));
        assert!(prompt.contains("1. find population"));
        assert!(prompt.contains("Step 1: find capital\nResult: Paris"));
    }

    #[tokio::test]
    async fn test_provider_error_is_final_response() {
        let llm = Arc::new(MockLlmClient::failing(LlmError::Auth("bad key".into())));
        match Replanner::new(llm).replan("o", &[], &[]).await {
            ReplanDecision::FinalResponse(text) => {
                assert!(text.starts_with("I encountered an error while processing your request:"));
                assert!(text.contains("bad key"));
            }
            other => panic!("expected final response, got {:?}", other),
        }
    }
}
