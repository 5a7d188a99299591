//! 单次查询的循环状态
//!
//! LoopState 由一次编排独占：目标只在创建时设定；计划从前往后消费，每轮取走队首一项；
//! 执行记录只追加不删除；设置最终回复后整个状态随结果返回并丢弃。

use serde::Serialize;

/// 一条执行记录：步骤描述 + 观察结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: String,
    pub observation: String,
}

impl StepRecord {
    pub fn new(step: impl Into<String>, observation: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            observation: observation.into(),
        }
    }
}

#[derive(Debug)]
pub struct LoopState {
    objective: String,
    plan: Vec<String>,
    history: Vec<StepRecord>,
    response: Option<String>,
}

impl LoopState {
    pub fn new(objective: impl Into<String>) -> Self {
        Self {
            objective: objective.into(),
            plan: Vec::new(),
            history: Vec::new(),
            response: None,
        }
    }

    pub fn objective(&self) -> &str {
        &self.objective
    }

    /// 剩余计划
    pub fn plan(&self) -> &[String] {
        &self.plan
    }

    /// 整体替换剩余计划（不是追加）
    pub fn set_plan(&mut self, steps: Vec<String>) {
        self.plan = steps;
    }

    /// 取出队首步骤
    pub fn next_step(&mut self) -> Option<String> {
        if self.plan.is_empty() {
            None
        } else {
            Some(self.plan.remove(0))
        }
    }

    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    pub fn record(&mut self, step: impl Into<String>, observation: impl Into<String>) {
        self.history.push(StepRecord::new(step, observation));
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }

    pub fn finish(&mut self, response: impl Into<String>) {
        self.response = Some(response.into());
    }

    /// 拆出执行记录与最终回复
    pub fn into_parts(self) -> (Vec<StepRecord>, Option<String>) {
        (self.history, self.response)
    }
}
