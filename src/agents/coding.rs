//! Coding Agent：生成、讲解、调试代码
//!
//! handle 按关键词再分派一次：
//! - debug / fix / error / exception -> debug_code，首个词之后的内容视为代码，`error:` 之后视为报错信息
//! - explain / how does / what does -> explain_code
//! - 其它 -> generate_code，语言从查询中识别（需出现 "in"，默认 python）

use std::sync::Arc;

use crate::agents::router::Normalized;
use crate::llm::LlmClient;

const DEBUG_KEYWORDS: &[&str] = &["debug", "fix", "error", "exception"];
const EXPLAIN_KEYWORDS: &[&str] = &["explain", "how does", "what does"];
/// 按此顺序识别语言
const LANGUAGES: &[&str] = &[
    "python", "javascript", "java", "c++", "c#", "ruby", "go", "rust",
];
pub const DEFAULT_LANGUAGE: &str = "python";

const ERROR_MARKER: &str = "error:";

/// 从查询中识别目标语言
pub fn detect_language(query: &str) -> &'static str {
    let q = Normalized::new(query);
    if !q.has("in") {
        return DEFAULT_LANGUAGE;
    }
    q.first_of(LANGUAGES).unwrap_or(DEFAULT_LANGUAGE)
}

/// 去掉首个词，剩余部分按 `error:` 拆成 (代码, 报错信息)
fn split_debug_request(query: &str) -> Option<(String, Option<String>)> {
    let (_, rest) = query.trim().split_once(char::is_whitespace)?;
    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }
    match rest.split_once(ERROR_MARKER) {
        Some((code, message)) => Some((code.trim().to_string(), Some(message.trim().to_string()))),
        None => Some((rest.to_string(), None)),
    }
}

fn strip_first_word(query: &str) -> Option<&str> {
    let (_, rest) = query.trim().split_once(char::is_whitespace)?;
    let rest = rest.trim();
    (!rest.is_empty()).then_some(rest)
}

pub struct CodingAgent {
    llm: Arc<dyn LlmClient>,
}

impl CodingAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    async fn call(&self, system: &str, user: &str) -> String {
        match self.llm.generate(system, user).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "coding agent failed");
                format!("Error: {}", e)
            }
        }
    }

    pub async fn generate_code(&self, prompt: &str, language: &str) -> String {
        let system = format!(
            "You are an expert programmer specializing in {}. \
Write clean, well-documented and efficient code. \
Include short comments for the non-obvious parts and follow the idioms of the language.",
            language
        );
        self.call(&system, prompt).await
    }

    pub async fn explain_code(&self, code: &str) -> String {
        let system = "You are an expert programmer. Explain the given code clearly: \
what it does, how it works step by step, and any notable patterns or pitfalls.";
        self.call(system, &format!("Explain this code:\n{}", code)).await
    }

    pub async fn debug_code(&self, code: &str, error_message: Option<&str>) -> String {
        let system = "You are an expert debugger. Find the problems in the given code, \
explain the cause, and provide a corrected version. \
If an error message is provided, focus on that specific error.";
        let mut user = format!("Debug this code:\n{}", code);
        if let Some(message) = error_message.filter(|m| !m.is_empty()) {
            user.push_str(&format!("\nError message:\n{}", message));
        }
        self.call(system, &user).await
    }

    /// 根据查询内容分派到 debug / explain / generate
    pub async fn handle(&self, query: &str) -> String {
        let q = Normalized::new(query);

        if q.has_any(DEBUG_KEYWORDS) {
            return match split_debug_request(query) {
                Some((code, message)) => self.debug_code(&code, message.as_deref()).await,
                None => "Please provide code to debug.".to_string(),
            };
        }

        if q.has_any(EXPLAIN_KEYWORDS) {
            return match strip_first_word(query) {
                Some(code) => self.explain_code(code).await,
                None => "Please provide code to explain.".to_string(),
            };
        }

        let language = detect_language(query);
        tracing::debug!(language, "generating code");
        self.generate_code(query, language).await
    }
}
