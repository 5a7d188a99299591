//! 外部事实检索：FactLookup 抽象与 Wikipedia 实现
//!
//! 检索结果过短（不足 MIN_INFORMATIVE_CHARS 个字符）表示「没有找到信息」，
//! 属于信息缺口而非错误；真正的网络/解析失败才返回 LookupError。

pub mod wikipedia;

use async_trait::async_trait;
use thiserror::Error;

pub use wikipedia::WikipediaLookup;

/// 检索结果至少这么多字符才视为有效信息
pub const MIN_INFORMATIVE_CHARS: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("HTTP {0}")]
    Http(u16),

    #[error("unexpected response: {0}")]
    Parse(String),
}

/// 事实检索：query -> 纯文本
#[async_trait]
pub trait FactLookup: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, LookupError>;
}

/// 结果是否包含可用信息
pub fn is_informative(text: &str) -> bool {
    text.trim().chars().count() >= MIN_INFORMATIVE_CHARS
}

/// 固定返回同一段文本的检索（离线运行与测试）
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    text: String,
}

impl StaticLookup {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl FactLookup for StaticLookup {
    async fn search(&self, _query: &str) -> Result<String, LookupError> {
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_informative_threshold() {
        assert!(!is_informative(""));
        assert!(!is_informative("   short  "));
        assert!(is_informative("Paris is the capital of France."));
    }

    #[tokio::test]
    async fn test_static_lookup() {
        let lookup = StaticLookup::new("fixed text");
        assert_eq!(lookup.search("anything").await.unwrap(), "fixed text");
    }
}
