//! 编排过程事件：供 CLI / Web 展示计划、步骤与结束原因

use serde::Serialize;

/// 单个事件（可序列化为 JSON 供前端展示）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanEvent {
    /// Planner 给出初始计划
    PlanCreated { steps: Vec<String> },
    /// 开始执行一步（iteration 从 1 开始）
    StepStarted { iteration: usize, step: String },
    /// 一步执行完成
    StepCompleted {
        iteration: usize,
        step: String,
        observation: String,
    },
    /// Replanner 替换了剩余计划
    PlanUpdated { steps: Vec<String> },
    /// Replanner 给出最终回复
    FinalResponse { text: String },
    /// 达到最大迭代次数
    IterationLimit { limit: usize },
    /// 计划耗尽或被截断，转 Answerer
    Fallback,
}
