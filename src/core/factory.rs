//! 组件装配：根据配置与环境变量选择 LLM 后端与事实检索实现

use std::sync::Arc;

use crate::config::AppConfig;
use crate::llm::{
    create_deepseek_client, create_openrouter_client, LlmClient, MockLlmClient, OpenAiClient,
    DEEPSEEK_CHAT,
};
use crate::tools::{FactLookup, WikipediaLookup};

fn has_env(key: &str) -> bool {
    std::env::var(key).map(|v| !v.trim().is_empty()).unwrap_or(false)
}

/// 根据配置与环境变量选择 LLM 后端（OpenRouter / OpenAI / DeepSeek / Mock）
///
/// 所选后端缺少 API Key 时退回 Mock 并告警，保证进程可以启动。
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    let params = cfg.llm.generation_params();
    let base_url = cfg.llm.base_url.as_deref();

    match provider.as_str() {
        "openrouter" if has_env("OPENROUTER_API_KEY") => {
            tracing::info!("Using OpenRouter LLM ({})", cfg.llm.model);
            Arc::new(create_openrouter_client(
                base_url,
                Some(&cfg.llm.model),
                params,
            ))
        }
        "openai" if has_env("OPENAI_API_KEY") => {
            // OpenRouter 风格的 "openai/xxx" 在官方端点上去掉前缀
            let model = cfg
                .llm
                .model
                .strip_prefix("openai/")
                .unwrap_or(&cfg.llm.model)
                .to_string();
            tracing::info!("Using OpenAI LLM ({})", model);
            Arc::new(
                OpenAiClient::new(
                    base_url,
                    &model,
                    std::env::var("OPENAI_API_KEY").ok().as_deref(),
                )
                .with_params(params),
            )
        }
        "deepseek" if has_env("DEEPSEEK_API_KEY") => {
            let model = if cfg.llm.model.starts_with("deepseek") {
                cfg.llm.model.clone()
            } else {
                DEEPSEEK_CHAT.to_string()
            };
            tracing::info!("Using DeepSeek LLM ({})", model);
            Arc::new(create_deepseek_client(base_url, Some(&model), params))
        }
        "mock" => {
            tracing::info!("Using Mock LLM");
            Arc::new(MockLlmClient::echo())
        }
        other => {
            tracing::warn!(provider = %other, "No API key set or provider unknown, using Mock LLM");
            Arc::new(MockLlmClient::echo())
        }
    }
}

/// 按 [wikipedia] 段创建事实检索；未启用时返回 None
pub fn create_fact_lookup(cfg: &AppConfig) -> Option<Arc<dyn FactLookup>> {
    if !cfg.wikipedia.enabled {
        tracing::info!("Wikipedia lookup disabled");
        return None;
    }
    Some(Arc::new(WikipediaLookup::from_config(&cfg.wikipedia)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_echoes() {
        let mut cfg = AppConfig::default();
        cfg.llm.provider = "mock".to_string();
        let llm = create_llm_from_config(&cfg);
        let out = llm.generate("sys", "ping").await.unwrap();
        assert!(out.contains("ping"));
    }

    #[test]
    fn test_lookup_disabled() {
        let mut cfg = AppConfig::default();
        cfg.wikipedia.enabled = false;
        assert!(create_fact_lookup(&cfg).is_none());
    }
}
