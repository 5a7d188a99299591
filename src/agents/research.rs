//! Research Agent：先查 Wikipedia，再让 LLM 写结构化研究摘要

use std::sync::Arc;

use crate::llm::LlmClient;
use crate::tools::{is_informative, FactLookup};

const RESEARCH_SYSTEM_PROMPT: &str =
    "You are a research assistant tasked with providing comprehensive information about topics.";

fn research_prompt(topic: &str, facts: &str) -> String {
    format!(
        "Based on the information provided, create a well-structured research summary that includes:\n\n\
1. Overview: A brief introduction to the topic\n\
2. Key Facts: Important information and data points\n\
3. History: Relevant historical context and timeline\n\
4. Significance: Why this topic matters\n\
5. Applications: How this information is used in the real world\n\
6. Related Topics: Connections to other fields or concepts\n\n\
If certain information is not available, acknowledge the gap instead of guessing.\n\n\
Topic: {}\n\n\
Information from Wikipedia:\n{}\n\n\
Research Summary:",
        topic, facts
    )
}

fn not_found(topic: &str) -> String {
    format!(
        "I couldn't find specific information about '{}' on Wikipedia. Please try a different search term or topic.",
        topic
    )
}

pub struct ResearchAgent {
    llm: Arc<dyn LlmClient>,
    lookup: Option<Arc<dyn FactLookup>>,
}

impl ResearchAgent {
    /// lookup 为 None 时（例如 Wikipedia 被禁用）所有主题都视为查不到
    pub fn new(llm: Arc<dyn LlmClient>, lookup: Option<Arc<dyn FactLookup>>) -> Self {
        Self { llm, lookup }
    }

    pub async fn research(&self, topic: &str) -> String {
        let Some(lookup) = &self.lookup else {
            tracing::warn!("research requested without a fact lookup");
            return not_found(topic);
        };

        let facts = match lookup.search(topic).await {
            Ok(text) if is_informative(&text) => text,
            Ok(_) => return not_found(topic),
            Err(e) => {
                tracing::warn!(error = %e, topic = %topic, "wikipedia lookup failed");
                return not_found(topic);
            }
        };

        match self
            .llm
            .generate(RESEARCH_SYSTEM_PROMPT, &research_prompt(topic, &facts))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "research summary failed");
                format!("I encountered an error while researching '{}': {}", topic, e)
            }
        }
    }
}
