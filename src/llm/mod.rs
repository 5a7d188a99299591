//! LLM 层：客户端抽象与实现（OpenAI 兼容 / OpenRouter / DeepSeek / Mock）

pub mod message;
pub mod mock;
pub mod openai;
pub mod openrouter;
pub mod traits;

pub use message::{Message, Role};
pub use mock::MockLlmClient;
pub use openai::{GenerationParams, OpenAiClient};
pub use openrouter::{
    create_deepseek_client, create_openrouter_client, DEEPSEEK_CHAT, OPENROUTER_DEFAULT_MODEL,
};
pub use traits::{LlmClient, LlmError};
