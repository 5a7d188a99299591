//! Headless Agent 运行时
//!
//! 供 CLI 与 HTTP 前端调用的无界面逻辑：AgentRuntime 持有路由器、编排器、各专用 Agent 与用量统计，
//! process_query 对单条输入选择 Agent、执行并返回回复与本次 token 数，永不失败。

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::agents::{
    AgentKind, AgentRouter, CodingAgent, ConceptAgent, MathAgent, ResearchAgent,
};
use crate::config::AppConfig;
use crate::core::{create_fact_lookup, create_llm_from_config, AgentError};
use crate::llm::LlmClient;
use crate::plan::parse::format_plan;
use crate::plan::{Answerer, Orchestrator, PlanEvent, Planner};
use crate::tools::FactLookup;
use crate::usage::{track_exchange, FileUsageTracker, NoopUsage, UsageSink, UsageSnapshot};

/// 空输入时的回复
pub const EMPTY_QUERY_RESPONSE: &str = "Please enter a question or task.";

/// 单次查询结果
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub response: String,
    pub agent: AgentKind,
    /// 本次查询统计到的 token 数（输入 + 输出）
    pub tokens: u64,
}

pub struct AgentRuntime {
    router: AgentRouter,
    orchestrator: Orchestrator,
    planner: Planner,
    answerer: Answerer,
    research: ResearchAgent,
    coding: CodingAgent,
    math: MathAgent,
    concept: ConceptAgent,
    usage: Arc<dyn UsageSink>,
    tracker: Option<Arc<FileUsageTracker>>,
    cost_per_1k_tokens: f64,
}

impl AgentRuntime {
    /// 用给定 LLM 与检索构建；用量默认不记录
    pub fn new(llm: Arc<dyn LlmClient>, lookup: Option<Arc<dyn FactLookup>>) -> Self {
        let usage: Arc<dyn UsageSink> = Arc::new(NoopUsage);
        Self {
            router: AgentRouter::new(),
            orchestrator: Orchestrator::from_llm(Arc::clone(&llm), lookup.clone())
                .with_usage_sink(Arc::clone(&usage)),
            planner: Planner::new(Arc::clone(&llm)),
            answerer: Answerer::new(Arc::clone(&llm)),
            research: ResearchAgent::new(Arc::clone(&llm), lookup),
            coding: CodingAgent::new(Arc::clone(&llm)),
            math: MathAgent::new(Arc::clone(&llm)),
            concept: ConceptAgent::new(llm),
            usage,
            tracker: None,
            cost_per_1k_tokens: 0.002,
        }
    }

    /// 从配置构建：LLM 后端、Wikipedia 检索、迭代上限与用量文件
    pub fn from_config(cfg: &AppConfig) -> Result<Self, AgentError> {
        let llm = create_llm_from_config(cfg);
        let lookup = create_fact_lookup(cfg);
        let tracker = Arc::new(FileUsageTracker::open(
            &cfg.app.usage_path,
            cfg.app.cost_per_1k_tokens,
        )?);

        let step_lookup = if cfg.orchestration.use_fact_lookup {
            lookup.clone()
        } else {
            None
        };

        let mut runtime = Self::new(Arc::clone(&llm), lookup);
        runtime.orchestrator = Orchestrator::from_llm(llm, step_lookup)
            .with_max_iterations(cfg.orchestration.iteration_limit());
        runtime.cost_per_1k_tokens = cfg.app.cost_per_1k_tokens;
        Ok(runtime.with_tracker(tracker))
    }

    /// 替换用量记录（编排器同步替换）
    pub fn with_usage_sink(mut self, sink: Arc<dyn UsageSink>) -> Self {
        self.orchestrator = self.orchestrator.with_usage_sink(Arc::clone(&sink));
        self.usage = sink;
        self
    }

    /// 使用文件用量统计，并提供 usage_summary / usage_snapshot
    pub fn with_tracker(mut self, tracker: Arc<FileUsageTracker>) -> Self {
        self = self.with_usage_sink(tracker.clone());
        self.tracker = Some(tracker);
        self
    }

    pub fn with_max_iterations(mut self, limit: Option<usize>) -> Self {
        self.orchestrator = self.orchestrator.with_max_iterations(limit);
        self
    }

    /// 多 Agent 编排过程事件
    pub fn with_events(mut self, tx: UnboundedSender<PlanEvent>) -> Self {
        self.orchestrator = self.orchestrator.with_events(tx);
        self
    }

    pub fn classify(&self, query: &str) -> AgentKind {
        self.router.classify(query)
    }

    pub fn cost_of(&self, tokens: u64) -> f64 {
        tokens as f64 / 1000.0 * self.cost_per_1k_tokens
    }

    pub fn usage_summary(&self) -> String {
        match &self.tracker {
            Some(tracker) => tracker.summary(),
            None => "Usage tracking is disabled.".to_string(),
        }
    }

    pub fn usage_snapshot(&self) -> Option<UsageSnapshot> {
        self.tracker.as_ref().map(|t| t.snapshot())
    }

    /// 处理一条查询；agent 为 None 时由路由器选择
    pub async fn process_query(&self, query: &str, agent: Option<AgentKind>) -> QueryOutcome {
        let query = query.trim();
        let agent = agent.unwrap_or_else(|| self.classify(query));

        if query.is_empty() {
            return QueryOutcome {
                response: EMPTY_QUERY_RESPONSE.to_string(),
                agent,
                tokens: 0,
            };
        }

        tracing::info!(agent = %agent, "processing query");

        // 编排器自己记录每个阶段的用量，其余 Agent 在这里统一记录输入与输出
        if agent == AgentKind::MultiAgent {
            let outcome = self.orchestrator.run(query).await;
            return QueryOutcome {
                response: outcome.response,
                agent,
                tokens: outcome.tokens,
            };
        }

        let response = match agent {
            AgentKind::Concept => self.concept.handle(query).await,
            AgentKind::Coding => self.coding.handle(query).await,
            AgentKind::Math => self.math.solve(query).await,
            AgentKind::Research => self.research.research(query).await,
            AgentKind::Planner => format_plan(&self.planner.plan(query).await),
            AgentKind::Answerer | AgentKind::MultiAgent => self.answerer.answer(query).await,
        };

        let tokens = track_exchange(Some(self.usage.as_ref()), query, &response);
        QueryOutcome {
            response,
            agent,
            tokens,
        }
    }
}
