//! 查询路由：按固定优先级的关键词规则选择 Agent
//!
//! 匹配在小写化、按词切分后的文本上进行，关键词必须以完整的词或词组出现，
//! 避免 "prime" 命中 "primer"、"java" 命中 "javascript" 这类子串误判。
//! 规则按下列顺序求值，先命中者胜出：
//! 1. Concept  2. Coding  3. Math  4. Research  5. Planner  6. MultiAgent（或超过 15 个词）  7. Answerer

use crate::agents::AgentKind;

/// 超过这么多词的查询默认交给多 Agent 编排
pub const MULTI_AGENT_WORD_THRESHOLD: usize = 15;

const CONCEPT_KEYWORDS: &[&str] = &[
    "chart", "charts", "plot", "graph", "visualize", "visualise", "visualization",
    "concept map", "mind map", "outline",
];

const CODING_KEYWORDS: &[&str] = &[
    "code", "coding", "program", "programming", "implement", "function", "class",
    "script", "debug", "fix", "bug", "error", "exception", "compile", "refactor",
    "algorithm", "data structure",
];

const MATH_KEYWORDS: &[&str] = &[
    "calculate", "math", "mathematical", "formula", "equation", "solve", "prime",
    "armstrong", "fibonacci", "factorial", "gcd", "lcm", "square root", "power",
    "exponent", "logarithm", "trigonometry", "geometry", "algebra", "calculus",
    "statistics", "probability",
];

const RESEARCH_KEYWORDS: &[&str] = &[
    "research", "find information about", "tell me about", "what is", "who is",
    "who was", "when did", "where is", "how does", "explain", "describe",
    "history of", "meaning of", "definition of", "facts about",
];

const PLANNER_KEYWORDS: &[&str] = &[
    "how to", "steps", "plan", "process", "guide", "instructions", "method",
    "way to", "approach", "strategy", "tutorial",
];

const MULTI_AGENT_KEYWORDS: &[&str] = &[
    "compare", "analyze", "analyse", "evaluate", "investigate", "study",
    "find out", "figure out", "determine",
];

/// 小写化并按词切分后的查询
#[derive(Debug, Clone)]
pub struct Normalized {
    /// 形如 " w1 w2 w3 "，首尾与词间各一个空格
    padded: String,
    words: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '+' || c == '#'
}

impl Normalized {
    pub fn new(text: &str) -> Self {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !is_word_char(c))
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            padded: format!(" {} ", words.join(" ")),
            words: words.len(),
        }
    }

    /// 是否包含完整的词或词组
    pub fn has(&self, phrase: &str) -> bool {
        self.padded.contains(&format!(" {} ", phrase))
    }

    pub fn has_any(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|p| self.has(p))
    }

    /// 按给定顺序返回第一个出现的词
    pub fn first_of<'a>(&self, candidates: &[&'a str]) -> Option<&'a str> {
        candidates.iter().copied().find(|c| self.has(c))
    }

    pub fn word_count(&self) -> usize {
        self.words
    }
}

/// 按优先级规则分类
#[derive(Debug, Default, Clone, Copy)]
pub struct AgentRouter;

impl AgentRouter {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, query: &str) -> AgentKind {
        let q = Normalized::new(query);

        if q.has_any(CONCEPT_KEYWORDS) {
            return AgentKind::Concept;
        }
        if q.has_any(CODING_KEYWORDS) {
            return AgentKind::Coding;
        }
        if q.has_any(MATH_KEYWORDS) {
            return AgentKind::Math;
        }
        if q.has_any(RESEARCH_KEYWORDS) {
            return AgentKind::Research;
        }
        if q.has_any(PLANNER_KEYWORDS) {
            return AgentKind::Planner;
        }
        if q.has_any(MULTI_AGENT_KEYWORDS) || q.word_count() > MULTI_AGENT_WORD_THRESHOLD {
            return AgentKind::MultiAgent;
        }
        AgentKind::Answerer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(q: &str) -> AgentKind {
        AgentRouter::new().classify(q)
    }

    #[test]
    fn test_each_rule() {
        assert_eq!(route("Plot the GDP of France and Spain"), AgentKind::Concept);
        assert_eq!(route("Write a function that reverses a list"), AgentKind::Coding);
        assert_eq!(route("Is 97 a prime number?"), AgentKind::Math);
        assert_eq!(route("Tell me about the Roman Empire"), AgentKind::Research);
        assert_eq!(route("How to learn the guitar"), AgentKind::Planner);
        assert_eq!(route("Compare Rust and Go"), AgentKind::MultiAgent);
        assert_eq!(route("hello there"), AgentKind::Answerer);
    }

    #[test]
    fn test_priority_order() {
        // concept 优先于 coding
        assert_eq!(route("plot the output of this function"), AgentKind::Concept);
        // coding 优先于 research
        assert_eq!(route("explain this code"), AgentKind::Coding);
        // math 优先于 multi-agent
        assert_eq!(route("determine the factorial of 10"), AgentKind::Math);
    }

    #[test]
    fn test_whole_word_matching() {
        // "primer" 不是 "prime"，"planet" 不是 "plan"
        assert_eq!(route("a primer on planets"), AgentKind::Answerer);
        assert_eq!(route("What's a good name?"), AgentKind::Answerer);
    }

    #[test]
    fn test_long_query_goes_to_multi_agent() {
        let q = "one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen";
        assert_eq!(route(q), AgentKind::MultiAgent);
        let q = "one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen";
        assert_eq!(route(q), AgentKind::Answerer);
    }

    #[test]
    fn test_normalized_keeps_symbols_in_words() {
        let q = Normalized::new("Write it in C++, please!");
        assert!(q.has("c++"));
        assert!(!q.has("c"));
        assert_eq!(q.first_of(&["java", "c++"]), Some("c++"));
    }
}
