//! OpenRouter / DeepSeek 客户端（均为 OpenAI 兼容格式）
//!
//! - OpenRouter: https://openrouter.ai/api/v1，模型名形如 `openai/gpt-3.5-turbo`
//! - DeepSeek: https://api.deepseek.com，默认模型 deepseek-chat

use crate::llm::openai::GenerationParams;
use crate::llm::OpenAiClient;

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const OPENROUTER_DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEEPSEEK_CHAT: &str = "deepseek-chat";

/// 创建 OpenRouter 客户端
///
/// - 使用环境变量 `OPENROUTER_API_KEY`
/// - 模型缺省为 `openai/gpt-3.5-turbo`，可通过 `OPENROUTER_MODEL` 覆盖
/// - `base_url` 为 None 时使用官方端点
pub fn create_openrouter_client(
    base_url: Option<&str>,
    model: Option<&str>,
    params: GenerationParams,
) -> OpenAiClient {
    let api_key = std::env::var("OPENROUTER_API_KEY").ok();

    let model = model
        .map(String::from)
        .or_else(|| std::env::var("OPENROUTER_MODEL").ok())
        .unwrap_or_else(|| OPENROUTER_DEFAULT_MODEL.to_string());

    let base_url = base_url.unwrap_or(OPENROUTER_BASE_URL);
    OpenAiClient::new(Some(base_url), &model, api_key.as_deref()).with_params(params)
}

/// 创建 DeepSeek 客户端
///
/// - 优先使用环境变量 `DEEPSEEK_API_KEY`
/// - 模型可通过 `model` 参数或 `DEEPSEEK_MODEL` 环境变量指定
pub fn create_deepseek_client(
    base_url: Option<&str>,
    model: Option<&str>,
    params: GenerationParams,
) -> OpenAiClient {
    let api_key = std::env::var("DEEPSEEK_API_KEY")
        .ok()
        .or_else(|| std::env::var("OPENAI_API_KEY").ok());

    let model = model
        .map(String::from)
        .or_else(|| std::env::var("DEEPSEEK_MODEL").ok())
        .unwrap_or_else(|| DEEPSEEK_CHAT.to_string());

    let base_url = base_url.unwrap_or(DEEPSEEK_BASE_URL);
    OpenAiClient::new(Some(base_url), &model, api_key.as_deref()).with_params(params)
}
