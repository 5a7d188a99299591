//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `WAGGLE__*` 覆盖（双下划线表示嵌套，如 `WAGGLE__LLM__PROVIDER=openai`）。
//! API Key 只从环境变量读取（OPENROUTER_API_KEY / OPENAI_API_KEY / DEEPSEEK_API_KEY），不进配置文件。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::llm::GenerationParams;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub orchestration: OrchestrationSection,
    pub wikipedia: WikipediaSection,
    pub web: WebSection,
}

/// [app] 段：应用名、用量文件与单价
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    pub name: Option<String>,
    /// 用量统计 JSON 文件路径
    #[serde(default = "default_usage_path")]
    pub usage_path: PathBuf,
    /// 每 1K token 的费用（美元）
    #[serde(default = "default_cost_per_1k_tokens")]
    pub cost_per_1k_tokens: f64,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            usage_path: default_usage_path(),
            cost_per_1k_tokens: default_cost_per_1k_tokens(),
        }
    }
}

fn default_usage_path() -> PathBuf {
    PathBuf::from("usage.json")
}

fn default_cost_per_1k_tokens() -> f64 {
    0.002
}

/// [llm] 段：后端选择、生成参数与超时
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：openrouter / openai / deepseek / mock
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// 覆盖所选后端的默认端点
    pub base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

impl LlmSection {
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            request_timeout: Duration::from_secs(self.timeouts.request),
        }
    }
}

fn default_provider() -> String {
    "openrouter".to_string()
}

fn default_model() -> String {
    "openai/gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsSection {
    #[serde(default = "default_request_timeout")]
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    60
}

/// [orchestration] 段：规划-执行-重规划循环
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestrationSection {
    /// 单次查询最多执行的步数；0 表示不设上限
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Executor 是否用 Wikipedia 检索补充步骤上下文
    #[serde(default = "default_true")]
    pub use_fact_lookup: bool,
}

impl Default for OrchestrationSection {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            use_fact_lookup: true,
        }
    }
}

impl OrchestrationSection {
    /// 迭代上限（None 为无上限）
    pub fn iteration_limit(&self) -> Option<usize> {
        (self.max_iterations > 0).then_some(self.max_iterations)
    }
}

fn default_max_iterations() -> usize {
    10
}

fn default_true() -> bool {
    true
}

/// [wikipedia] 段：检索语言、结果条数、截断与超时
#[derive(Debug, Clone, Deserialize)]
pub struct WikipediaSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_top_k_results")]
    pub top_k_results: usize,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_wiki_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WikipediaSection {
    fn default() -> Self {
        Self {
            enabled: true,
            language: default_language(),
            top_k_results: default_top_k_results(),
            max_chars: default_max_chars(),
            timeout_secs: default_wiki_timeout_secs(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_top_k_results() -> usize {
    3
}

fn default_max_chars() -> usize {
    4000
}

fn default_wiki_timeout_secs() -> u64 {
    15
}

/// [web] 段
#[derive(Debug, Clone, Deserialize)]
pub struct WebSection {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    5000
}

/// 从 config 目录加载配置，环境变量 WAGGLE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 WAGGLE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("WAGGLE")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.llm.provider, "openrouter");
        assert_eq!(cfg.orchestration.iteration_limit(), Some(10));
        assert_eq!(cfg.wikipedia.top_k_results, 3);
        assert!((cfg.app.cost_per_1k_tokens - 0.002).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_iterations_means_unbounded() {
        let section = OrchestrationSection {
            max_iterations: 0,
            use_fact_lookup: false,
        };
        assert_eq!(section.iteration_limit(), None);
    }

    #[test]
    fn test_load_explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waggle.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "[llm]\nprovider = \"mock\"\nmax_tokens = 256\n\n[orchestration]\nmax_iterations = 4"
        )
        .unwrap();

        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.llm.provider, "mock");
        assert_eq!(cfg.llm.max_tokens, 256);
        assert_eq!(cfg.llm.model, "openai/gpt-3.5-turbo");
        assert_eq!(cfg.orchestration.max_iterations, 4);
        assert!(cfg.orchestration.use_fact_lookup);
    }
}
