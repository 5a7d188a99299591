//! 核心装配层：错误类型与组件工厂

pub mod error;
pub mod factory;

pub use error::AgentError;
pub use factory::{create_fact_lookup, create_llm_from_config};
