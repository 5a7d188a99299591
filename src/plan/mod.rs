//! Plan-Execute-Replan 编排
//!
//! - parse：计划文本的行级解析与最终答案判定
//! - state：LoopState / StepRecord
//! - planner / executor / replanner / answerer：四个 LLM 组件，各自吸收提供方错误
//! - loop_：Orchestrator 主循环

pub mod answerer;
pub mod events;
pub mod executor;
pub mod loop_;
pub mod parse;
pub mod planner;
pub mod replanner;
pub mod state;

pub use answerer::Answerer;
pub use events::PlanEvent;
pub use executor::StepExecutor;
pub use loop_::{OrchestrationOutcome, Orchestrator, Termination, DEFAULT_MAX_ITERATIONS};
pub use parse::{is_final_answer, parse_steps};
pub use planner::Planner;
pub use replanner::{ReplanDecision, Replanner};
pub use state::{LoopState, StepRecord};
