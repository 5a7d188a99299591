//! 用量统计：UsageSink 能力接口、Token 计数与文件持久化
//!
//! 编排核心与 AgentRuntime 只依赖 UsageSink；持久化方式由宿主进程决定。

pub mod tokenizer;
pub mod tracker;

pub use tokenizer::count_tokens;
pub use tracker::{FileUsageTracker, UsageSnapshot};

/// 用量记录能力
pub trait UsageSink: Send + Sync {
    fn record(&self, tokens: u64);
}

/// 不记录任何用量
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopUsage;

impl UsageSink for NoopUsage {
    fn record(&self, _tokens: u64) {}
}

/// 统计一次问答（输入 + 输出）的 token 并分别记入 sink，返回合计
pub fn track_exchange(sink: Option<&dyn UsageSink>, input: &str, output: &str) -> u64 {
    let input_tokens = count_tokens(input);
    let output_tokens = count_tokens(output);
    if let Some(sink) = sink {
        sink.record(input_tokens);
        sink.record(output_tokens);
    }
    input_tokens + output_tokens
}
