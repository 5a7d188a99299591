//! 计划文本解析
//!
//! LLM 以自由文本给出计划，这里用行级启发式切分为步骤：
//! - 以编号或项目符号开头的行（`1.` `1)` `-` `*` `•` `→` `>>` `>`）去掉标记后各算一步；
//! - 其它以句末标点结尾且较短的行也算一步；
//! - 一行都不匹配时，整段文本作为唯一一步。
//!
//! 同一套规则也用于判断重规划输出是「最终答案」还是「新计划」。

use std::sync::OnceLock;

use regex::Regex;

use crate::plan::StepRecord;

/// 无标记的句子行被当作步骤的最大字符数（不含）
pub const MAX_SENTENCE_STEP_CHARS: usize = 100;
/// 少于这么多行的重规划输出视为最终答案
pub const FINAL_ANSWER_MAX_LINES: usize = 3;
/// 且字符数少于此值
pub const FINAL_ANSWER_MAX_CHARS: usize = 500;

static MARKER: OnceLock<Regex> = OnceLock::new();

fn marker() -> &'static Regex {
    MARKER.get_or_init(|| {
        Regex::new(r"^(?:\d+[.)]|>>|[-*•→>])\s+").expect("valid list marker pattern")
    })
}

fn ends_with_terminal(line: &str) -> bool {
    line.ends_with(['.', '?', '!'])
}

/// 将自由文本切分为有序步骤；保证至少返回一项
pub fn parse_steps(response: &str) -> Vec<String> {
    let mut steps = Vec::new();

    for line in response.trim().lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(m) = marker().find(line) {
            let step = line[m.end()..].trim();
            if !step.is_empty() {
                steps.push(step.to_string());
            }
        } else if ends_with_terminal(line) && line.chars().count() < MAX_SENTENCE_STEP_CHARS {
            steps.push(line.to_string());
        }
    }

    if steps.is_empty() {
        steps.push(response.trim().to_string());
    }
    steps
}

/// 重规划输出是否像一个直接的最终答案（短且行数少）
pub fn is_final_answer(response: &str) -> bool {
    let text = response.trim();
    text.split('\n').count() < FINAL_ANSWER_MAX_LINES
        && text.chars().count() < FINAL_ANSWER_MAX_CHARS
}

/// 编号列表："1. a\n2. b"
pub fn format_plan(steps: &[String]) -> String {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 已执行步骤序列化为文本，供重规划提示词使用
pub fn format_history(history: &[StepRecord]) -> String {
    if history.is_empty() {
        return "(none)".to_string();
    }
    history
        .iter()
        .enumerate()
        .map(|(i, record)| {
            format!(
                "Step {}: {}\nResult: {}",
                i + 1,
                record.step,
                record.observation.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_list() {
        let steps = parse_steps("Here is the plan:\n1. Find the capital of France\n2. Find its 2020 population\n3) Compute 15% of it");
        assert_eq!(
            steps,
            vec![
                "Find the capital of France",
                "Find its 2020 population",
                "Compute 15% of it"
            ]
        );
    }

    #[test]
    fn test_bullets_of_every_kind() {
        let text = "- alpha\n* beta\n• gamma\n→ delta\n>> epsilon\n> zeta";
        assert_eq!(
            parse_steps(text),
            vec!["alpha", "beta", "gamma", "delta", "epsilon", "zeta"]
        );
    }

    #[test]
    fn test_double_digit_numbering() {
        let text = (1..=11)
            .map(|i| format!("{}. step {}", i, i))
            .collect::<Vec<_>>()
            .join("\n");
        let steps = parse_steps(&text);
        assert_eq!(steps.len(), 11);
        assert_eq!(steps[10], "step 11");
    }

    #[test]
    fn test_short_sentences_are_steps() {
        let text = "First, search for the capital of France.\nWhat is its population?\nThis line has no terminal punctuation";
        assert_eq!(
            parse_steps(text),
            vec![
                "First, search for the capital of France.",
                "What is its population?"
            ]
        );
    }

    #[test]
    fn test_long_sentence_is_not_a_step() {
        let long = format!("{}.", "word ".repeat(30).trim());
        let text = format!("{}\n- real step", long);
        assert_eq!(parse_steps(&text), vec!["real step"]);
    }

    #[test]
    fn test_no_match_returns_whole_response() {
        let text = "Just look it up\nand report back";
        assert_eq!(parse_steps(text), vec![text]);
    }

    #[test]
    fn test_marker_requires_whitespace() {
        // "1.5" 不是编号
        assert_eq!(
            parse_steps("1.5 million people live there"),
            vec!["1.5 million people live there"]
        );
    }

    #[test]
    fn test_is_final_answer() {
        assert!(is_final_answer("Paris. 15% of 2,175,601 is about 326,340."));
        assert!(is_final_answer("line one\nline two\n"));
        assert!(!is_final_answer("a\nb\nc"));
        assert!(!is_final_answer(&"x".repeat(500)));
    }

    #[test]
    fn test_format_plan_and_history() {
        let plan = vec!["a".to_string(), "b".to_string()];
        assert_eq!(format_plan(&plan), "1. a\n2. b");

        let history = vec![StepRecord::new("find x", " x is 1 ")];
        assert_eq!(format_history(&history), "Step 1: find x\nResult: x is 1");
        assert_eq!(format_history(&[]), "(none)");
    }
}
