//! Token 计数
//!
//! 使用 cl100k_base BPE（gpt-3.5/gpt-4 系列编码）计数；编码器构建失败时退回按空白分词的粗略估计。

use std::sync::OnceLock;

use tiktoken_rs::CoreBPE;

/// 全局 BPE 实例（延迟初始化；None 表示构建失败）
static BPE: OnceLock<Option<CoreBPE>> = OnceLock::new();

fn get_bpe() -> Option<&'static CoreBPE> {
    BPE.get_or_init(|| match tiktoken_rs::cl100k_base() {
        Ok(bpe) => Some(bpe),
        Err(e) => {
            tracing::warn!(error = %e, "cl100k_base unavailable, falling back to word estimate");
            None
        }
    })
    .as_ref()
}

/// 粗略估计：每个空白分隔的词约 4/3 个 token
pub fn estimate_tokens(text: &str) -> u64 {
    let words = text.split_whitespace().count() as u64;
    (words * 4).div_ceil(3)
}

/// 计算文本的 token 数
pub fn count_tokens(text: &str) -> u64 {
    if text.is_empty() {
        return 0;
    }
    match get_bpe() {
        Some(bpe) => bpe.encode_with_special_tokens(text).len() as u64,
        None => estimate_tokens(text),
    }
}
