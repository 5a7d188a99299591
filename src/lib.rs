//! Waggle - Rust 多智能体对话编排器
//!
//! 模块划分：
//! - **agent**: 无头运行时 AgentRuntime（供 CLI / HTTP 调用）
//! - **agents**: 查询路由与专用 Agent（研究、编程、数学、概念图表）
//! - **cli**: REPL 输入解析
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型与组件装配
//! - **llm**: LLM 客户端抽象与实现（OpenRouter / OpenAI / DeepSeek / Mock）
//! - **observability**: tracing 初始化
//! - **plan**: Plan-Execute-Replan 编排循环
//! - **tools**: 事实检索（Wikipedia）
//! - **usage**: Token 计数与用量持久化

pub mod agent;
pub mod agents;
pub mod cli;
pub mod config;
pub mod core;
pub mod llm;
pub mod observability;
pub mod plan;
pub mod tools;
pub mod usage;

pub use agent::{AgentRuntime, QueryOutcome};
pub use agents::AgentKind;
pub use plan::{OrchestrationOutcome, Orchestrator, Termination};
