//! Web 回复整理：非编码类回复按行规整，便于前端逐行展示
//!
//! - 编码 Agent 的回复、含代码块的回复原样返回；
//! - `1. **标题**` 形式的编号要点去掉加粗并重新连续编号；
//! - 已是列表的回复只去掉空行与行首尾空白；
//! - 其它文本按句末标点断行。

use std::sync::OnceLock;

use regex::Regex;

use crate::agents::AgentKind;

static BOLD_POINT: OnceLock<Regex> = OnceLock::new();
static LIST_LINE: OnceLock<Regex> = OnceLock::new();
static SENTENCE_END: OnceLock<Regex> = OnceLock::new();

fn bold_point() -> &'static Regex {
    BOLD_POINT.get_or_init(|| Regex::new(r"^\d+\.\s*\*\*").expect("valid bold point pattern"))
}

fn list_line() -> &'static Regex {
    LIST_LINE.get_or_init(|| {
        Regex::new(r"(?m)^\s*[-•*]\s|^\d+\.\s").expect("valid list line pattern")
    })
}

fn sentence_end() -> &'static Regex {
    SENTENCE_END.get_or_init(|| Regex::new(r"[.!?]\s+").expect("valid sentence pattern"))
}

fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

fn renumber_bold_points(text: &str) -> String {
    let mut number = 1;
    non_empty_lines(text)
        .map(|line| match bold_point().find(line) {
            Some(m) => {
                let content = line[m.end()..].replace("**", "");
                let out = format!("{}. {}", number, content.trim());
                number += 1;
                out
            }
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn split_sentences(text: &str) -> String {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in sentence_end().find_iter(text) {
        // 标点留在句内，空白丢弃
        sentences.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&text[start..]);
    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_structured_response(response: &str, agent: AgentKind) -> String {
    if agent == AgentKind::Coding || response.contains("```") {
        return response.to_string();
    }
    if non_empty_lines(response).any(|l| bold_point().is_match(l)) {
        return renumber_bold_points(response);
    }
    if list_line().is_match(response) {
        return non_empty_lines(response).collect::<Vec<_>>().join("\n");
    }
    split_sentences(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coding_and_code_blocks_untouched() {
        let text = "Use this.  It works.\n\n";
        assert_eq!(format_structured_response(text, AgentKind::Coding), text);
        let block = "Example:\n```rust\nfn main() {}\n```";
        assert_eq!(format_structured_response(block, AgentKind::Research), block);
    }

    #[test]
    fn test_bold_points_are_renumbered() {
        let text = "Overview\n\n3. **Speed**: fast\n7. **Safety**: strong types\n";
        assert_eq!(
            format_structured_response(text, AgentKind::Research),
            "Overview\n1. Speed: fast\n2. Safety: strong types"
        );
    }

    #[test]
    fn test_lists_lose_blank_lines() {
        let text = "- first\n\n  - second  \n";
        assert_eq!(
            format_structured_response(text, AgentKind::Planner),
            "- first\n- second"
        );
    }

    #[test]
    fn test_prose_is_split_by_sentence() {
        let text = "Paris is the capital. It had 2.1 million people!  Nice?";
        assert_eq!(
            format_structured_response(text, AgentKind::Answerer),
            "Paris is the capital.\nIt had 2.1 million people!\nNice?"
        );
    }
}
