//! 编排主循环
//!
//! Plan -> Execute -> Replan -> (Execute | Done)，计划耗尽或达到迭代上限时转 Answerer。
//! 每个阶段依次 await，步骤之间不并发；LoopState 只属于本次调用。
//! 所有失败都在各组件内部转成文本，run 永不返回错误。

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::llm::LlmClient;
use crate::plan::parse::{format_history, format_plan};
use crate::plan::{
    Answerer, LoopState, PlanEvent, Planner, ReplanDecision, Replanner, StepExecutor, StepRecord,
};
use crate::tools::FactLookup;
use crate::usage::{track_exchange, UsageSink};

/// 默认最大迭代次数（每次迭代执行一步）
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// 循环结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Replanner 给出最终回复
    FinalResponse,
    /// 计划耗尽，由 Answerer 兜底
    PlanExhausted,
    /// 达到迭代上限，由 Answerer 兜底
    IterationLimit,
}

/// 一次编排的结果
#[derive(Debug, Clone, Serialize)]
pub struct OrchestrationOutcome {
    pub response: String,
    pub history: Vec<StepRecord>,
    /// 实际执行的步数
    pub iterations: usize,
    pub termination: Termination,
    /// 本次编排统计到的 token 数
    pub tokens: u64,
}

pub struct Orchestrator {
    planner: Planner,
    executor: StepExecutor,
    replanner: Replanner,
    answerer: Answerer,
    max_iterations: Option<usize>,
    usage: Option<Arc<dyn UsageSink>>,
    events: Option<UnboundedSender<PlanEvent>>,
}

impl Orchestrator {
    pub fn new(
        planner: Planner,
        executor: StepExecutor,
        replanner: Replanner,
        answerer: Answerer,
    ) -> Self {
        Self {
            planner,
            executor,
            replanner,
            answerer,
            max_iterations: Some(DEFAULT_MAX_ITERATIONS),
            usage: None,
            events: None,
        }
    }

    /// 四个组件共用同一个 LLM
    pub fn from_llm(llm: Arc<dyn LlmClient>, lookup: Option<Arc<dyn FactLookup>>) -> Self {
        let mut executor = StepExecutor::new(Arc::clone(&llm));
        if let Some(lookup) = lookup {
            executor = executor.with_lookup(lookup);
        }
        Self::new(
            Planner::new(Arc::clone(&llm)),
            executor,
            Replanner::new(Arc::clone(&llm)),
            Answerer::new(llm),
        )
    }

    /// None 表示不设上限
    pub fn with_max_iterations(mut self, limit: Option<usize>) -> Self {
        self.max_iterations = limit;
        self
    }

    pub fn with_usage_sink(mut self, sink: Arc<dyn UsageSink>) -> Self {
        self.usage = Some(sink);
        self
    }

    pub fn with_events(mut self, tx: UnboundedSender<PlanEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    fn emit(&self, event: PlanEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    fn track(&self, input: &str, output: &str) -> u64 {
        track_exchange(self.usage.as_deref(), input, output)
    }

    /// 只要最终回复文本
    pub async fn run_orchestration(&self, objective: &str) -> String {
        self.run(objective).await.response
    }

    /// 完整运行一次编排
    pub async fn run(&self, objective: &str) -> OrchestrationOutcome {
        let mut state = LoopState::new(objective);
        let mut tokens = 0u64;
        let mut iterations = 0usize;
        let mut hit_limit = false;

        let steps = self.planner.plan(state.objective()).await;
        tokens += self.track(state.objective(), &format_plan(&steps));
        tracing::info!(steps = steps.len(), "plan created");
        self.emit(PlanEvent::PlanCreated {
            steps: steps.clone(),
        });
        state.set_plan(steps);

        while !state.has_response() {
            if let Some(limit) = self.max_iterations {
                if iterations >= limit && !state.plan().is_empty() {
                    tracing::warn!(limit, "iteration limit reached, falling back to answerer");
                    self.emit(PlanEvent::IterationLimit { limit });
                    hit_limit = true;
                    break;
                }
            }

            let Some(task) = state.next_step() else {
                break;
            };
            iterations += 1;

            tracing::debug!(iteration = iterations, step = %task, "executing step");
            self.emit(PlanEvent::StepStarted {
                iteration: iterations,
                step: task.clone(),
            });
            let observation = self.executor.execute(&task).await;
            tokens += self.track(&task, &observation);
            self.emit(PlanEvent::StepCompleted {
                iteration: iterations,
                step: task.clone(),
                observation: observation.clone(),
            });
            state.record(task, observation);

            let decision = self
                .replanner
                .replan(state.objective(), state.plan(), state.history())
                .await;
            let replan_input = format_history(state.history());
            match decision {
                ReplanDecision::FinalResponse(text) if text.trim().is_empty() => {
                    tokens += self.track(&replan_input, "");
                    tracing::debug!("replanner returned blank text, continuing");
                }
                ReplanDecision::FinalResponse(text) => {
                    tokens += self.track(&replan_input, &text);
                    self.emit(PlanEvent::FinalResponse { text: text.clone() });
                    state.finish(text);
                }
                ReplanDecision::UpdatedPlan(steps) => {
                    tokens += self.track(&replan_input, &format_plan(&steps));
                    tracing::debug!(steps = steps.len(), "plan updated");
                    self.emit(PlanEvent::PlanUpdated {
                        steps: steps.clone(),
                    });
                    state.set_plan(steps);
                }
            }
        }

        let termination = if state.has_response() {
            Termination::FinalResponse
        } else {
            self.emit(PlanEvent::Fallback);
            let answer = self.answerer.answer(state.objective()).await;
            tokens += self.track(state.objective(), &answer);
            state.finish(answer);
            if hit_limit {
                Termination::IterationLimit
            } else {
                Termination::PlanExhausted
            }
        };

        let (history, response) = state.into_parts();
        tracing::info!(iterations, ?termination, tokens, "orchestration finished");
        OrchestrationOutcome {
            response: response.unwrap_or_default(),
            history,
            iterations,
            termination,
            tokens,
        }
    }
}
