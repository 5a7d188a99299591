//! 专用 Agent 与查询路由
//!
//! 每个 Agent 都是对 LlmClient 的一次性调用（Research 额外做一次事实检索），
//! 提供方错误一律转成文本返回。

pub mod coding;
pub mod concept;
pub mod format;
pub mod math;
pub mod research;
pub mod router;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

pub use coding::CodingAgent;
pub use concept::{ChartSpec, ChartType, ConceptAgent};
pub use format::format_structured_response;
pub use math::MathAgent;
pub use research::ResearchAgent;
pub use router::AgentRouter;

/// 可处理查询的 Agent 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Concept,
    Coding,
    Math,
    Research,
    Planner,
    #[serde(rename = "multi")]
    MultiAgent,
    Answerer,
}

impl AgentKind {
    pub const ALL: [AgentKind; 7] = [
        AgentKind::Concept,
        AgentKind::Coding,
        AgentKind::Math,
        AgentKind::Research,
        AgentKind::Planner,
        AgentKind::MultiAgent,
        AgentKind::Answerer,
    ];

    /// CLI / HTTP 使用的名称
    pub fn name(self) -> &'static str {
        match self {
            AgentKind::Concept => "concept",
            AgentKind::Coding => "coding",
            AgentKind::Math => "math",
            AgentKind::Research => "research",
            AgentKind::Planner => "planner",
            AgentKind::MultiAgent => "multi",
            AgentKind::Answerer => "answerer",
        }
    }

    /// 一句话说明，用于帮助信息
    pub fn description(self) -> &'static str {
        match self {
            AgentKind::Concept => "concept outlines and chart specs",
            AgentKind::Coding => "code generation, explanation and debugging",
            AgentKind::Math => "step-by-step math solutions",
            AgentKind::Research => "Wikipedia-backed research summaries",
            AgentKind::Planner => "a numbered plan without executing it",
            AgentKind::MultiAgent => "plan, execute and replan until done",
            AgentKind::Answerer => "a direct answer",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown agent: {0}")]
pub struct UnknownAgent(pub String);

impl FromStr for AgentKind {
    type Err = UnknownAgent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "concept" | "chart" => Ok(AgentKind::Concept),
            "coding" | "code" => Ok(AgentKind::Coding),
            "math" | "executor" => Ok(AgentKind::Math),
            "research" => Ok(AgentKind::Research),
            "planner" | "plan" => Ok(AgentKind::Planner),
            "multi" | "multi-agent" | "multi_agent" => Ok(AgentKind::MultiAgent),
            "answerer" | "answer" => Ok(AgentKind::Answerer),
            other => Err(UnknownAgent(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in AgentKind::ALL {
            assert_eq!(kind.name().parse::<AgentKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!("executor".parse::<AgentKind>(), Ok(AgentKind::Math));
        assert_eq!("Multi-Agent".parse::<AgentKind>(), Ok(AgentKind::MultiAgent));
        assert!("wizard".parse::<AgentKind>().is_err());
    }

    #[test]
    fn test_serializes_as_name() {
        let json = serde_json::to_string(&AgentKind::MultiAgent).unwrap();
        assert_eq!(json, "\"multi\"");
    }
}
