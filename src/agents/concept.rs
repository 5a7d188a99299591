//! Concept Agent：概念大纲与图表规格
//!
//! 图表类查询让 LLM 按固定格式给出规格：
//!
//! ```text
//! Chart Type: bar
//! Title: ...
//! X Label: ...
//! Y Label: ...
//! Data: {"Label1": 1, "Label2": 2}
//! ```
//!
//! 解析成 ChartSpec 后以文本表格呈现（不绘制图片）；解析失败时退回概念大纲，并在开头注明原因。

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::agents::router::Normalized;
use crate::llm::LlmClient;

const CHART_KEYWORDS: &[&str] = &[
    "plot", "chart", "charts", "graph", "visualize", "visualise", "visualization", "compare",
];

const CONCEPT_SYSTEM_PROMPT: &str = "You are a concept mapping and data assistant.";
const CHART_SYSTEM_PROMPT: &str = "You are a visualization planner.";

fn concept_prompt(topic: &str) -> String {
    format!(
        "Create a structured, multi-level outline of the topic: \"{}\"\n\n\
Provide the following in markdown format:\n\n\
1. High-level overview (2-3 sentences)\n\
2. Mind map style bullet points with nested subpoints\n\
3. Key facts or data points (dates, numbers, definitions)\n\
4. Applications or real-world use cases\n\
5. Related concepts or fields\n\
6. Recent trends or news (if relevant)",
        topic
    )
}

fn chart_prompt(query: &str) -> String {
    format!(
        "Extract or assume a small synthetic dataset (2-5 data points) to visualize the user's request.\n\n\
Query: {}\n\n\
Respond exactly in this format:\n\
Chart Type: bar | line | pie\n\
Title: ...\n\
X Label: ...\n\
Y Label: ...\n\
Data: {{\"Label1\": number, \"Label2\": number}}",
        query
    )
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("unsupported chart type '{0}'")]
    UnsupportedType(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
}

impl FromStr for ChartType {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        // 允许 "bar chart"、"Line graph" 之类的写法
        match lower.split_whitespace().next().unwrap_or("") {
            "bar" => Ok(ChartType::Bar),
            "line" => Ok(ChartType::Line),
            "pie" => Ok(ChartType::Pie),
            _ => Err(ChartError::UnsupportedType(s.trim().to_string())),
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
        };
        f.write_str(name)
    }
}

/// 图表规格；data 保持 LLM 给出的顺序
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub data: Vec<(String, f64)>,
}

/// 取 `Label:` 之后到行尾的内容
fn field<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    text.lines().find_map(|line| {
        line.trim()
            .strip_prefix(label)
            .map(|rest| rest.trim())
    })
}

fn parse_data(text: &str) -> Result<Vec<(String, f64)>, ChartError> {
    let after = text
        .split_once("Data:")
        .map(|(_, rest)| rest)
        .ok_or(ChartError::MissingField("Data"))?;
    let start = after
        .find('{')
        .ok_or_else(|| ChartError::InvalidData("expected a JSON object".into()))?;
    let end = after
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| ChartError::InvalidData("unterminated JSON object".into()))?;

    let map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&after[start..=end]).map_err(|e| ChartError::InvalidData(e.to_string()))?;

    let mut data = Vec::with_capacity(map.len());
    for (label, value) in map {
        let number = value
            .as_f64()
            .ok_or_else(|| ChartError::InvalidData(format!("value for '{}' is not a number", label)))?;
        data.push((label, number));
    }
    if data.is_empty() {
        return Err(ChartError::InvalidData("no data points".into()));
    }
    Ok(data)
}

impl ChartSpec {
    pub fn parse(text: &str) -> Result<Self, ChartError> {
        let chart_type = field(text, "Chart Type:")
            .ok_or(ChartError::MissingField("Chart Type"))?
            .parse()?;
        let title = field(text, "Title:")
            .ok_or(ChartError::MissingField("Title"))?
            .to_string();
        let x_label = field(text, "X Label:").unwrap_or_default().to_string();
        let y_label = field(text, "Y Label:").unwrap_or_default().to_string();
        let data = parse_data(text)?;

        Ok(Self {
            chart_type,
            title,
            x_label,
            y_label,
            data,
        })
    }

    pub fn total(&self) -> f64 {
        self.data.iter().map(|(_, v)| v).sum()
    }
}

impl fmt::Display for ChartSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} chart)", self.title, self.chart_type)?;
        let label_width = self
            .data
            .iter()
            .map(|(l, _)| l.chars().count())
            .chain(std::iter::once(self.x_label.chars().count()))
            .max()
            .unwrap_or(0);

        if self.chart_type != ChartType::Pie && !(self.x_label.is_empty() && self.y_label.is_empty()) {
            writeln!(f, "{:<width$} | {}", self.x_label, self.y_label, width = label_width)?;
        }

        let total = self.total();
        for (label, value) in &self.data {
            if self.chart_type == ChartType::Pie && total > 0.0 {
                writeln!(
                    f,
                    "{:<width$} | {} ({:.1}%)",
                    label,
                    value,
                    value / total * 100.0,
                    width = label_width
                )?;
            } else {
                writeln!(f, "{:<width$} | {}", label, value, width = label_width)?;
            }
        }
        Ok(())
    }
}

pub struct ConceptAgent {
    llm: Arc<dyn LlmClient>,
}

impl ConceptAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub fn is_chart_request(query: &str) -> bool {
        Normalized::new(query).has_any(CHART_KEYWORDS)
    }

    pub async fn outline(&self, topic: &str) -> String {
        match self.llm.generate(CONCEPT_SYSTEM_PROMPT, &concept_prompt(topic)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "concept outline failed");
                format!("Error: {}", e)
            }
        }
    }

    /// 请求图表规格并解析
    pub async fn chart(&self, query: &str) -> Result<ChartSpec, ChartError> {
        let text = self
            .llm
            .generate(CHART_SYSTEM_PROMPT, &chart_prompt(query))
            .await
            .map_err(|e| ChartError::InvalidData(e.to_string()))?;
        ChartSpec::parse(&text)
    }

    pub async fn handle(&self, query: &str) -> String {
        if !Self::is_chart_request(query) {
            return self.outline(query).await;
        }

        match self.chart(query).await {
            Ok(spec) => format!("{}\n_(Generated chart specification based on your query)_", spec),
            Err(e) => {
                tracing::warn!(error = %e, "chart spec unusable, falling back to outline");
                let outline = self.outline(query).await;
                format!(
                    "Error generating chart: {}\n\nFalling back to concept mapping:\n\n{}",
                    e, outline
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    const SPEC: &str = "Chart Type: Bar\nTitle: Fruit sales\nX Label: Fruit\nY Label: Units\nData: {\"Oranges\": 30, \"Apples\": 12.5}";

    #[test]
    fn test_parse_chart_spec() {
        let spec = ChartSpec::parse(SPEC).unwrap();
        assert_eq!(spec.chart_type, ChartType::Bar);
        assert_eq!(spec.title, "Fruit sales");
        assert_eq!(spec.x_label, "Fruit");
        assert_eq!(spec.y_label, "Units");
        // 保持原始顺序
        assert_eq!(
            spec.data,
            vec![("Oranges".to_string(), 30.0), ("Apples".to_string(), 12.5)]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ChartSpec::parse("Title: x\nData: {\"a\": 1}"),
            Err(ChartError::MissingField("Chart Type"))
        );
        assert!(matches!(
            ChartSpec::parse("Chart Type: radar\nTitle: x\nData: {\"a\": 1}"),
            Err(ChartError::UnsupportedType(_))
        ));
        assert!(matches!(
            ChartSpec::parse("Chart Type: pie\nTitle: x\nData: {\"a\": \"lots\"}"),
            Err(ChartError::InvalidData(_))
        ));
        assert!(matches!(
            ChartSpec::parse("Chart Type: pie\nTitle: x\nData: none"),
            Err(ChartError::InvalidData(_))
        ));
    }

    #[test]
    fn test_pie_table_shows_shares() {
        let spec = ChartSpec::parse("Chart Type: pie chart\nTitle: Share\nData: {\"A\": 1, \"B\": 3}").unwrap();
        let table = spec.to_string();
        assert!(table.starts_with("Share (pie chart)"));
        assert!(table.contains("A | 1 (25.0%)"));
        assert!(table.contains("B | 3 (75.0%)"));
    }

    #[tokio::test]
    async fn test_handle_chart() {
        let llm = Arc::new(MockLlmClient::scripted([SPEC]));
        let out = ConceptAgent::new(llm).handle("plot fruit sales").await;
        assert!(out.starts_with("Fruit sales (bar chart)"));
        assert!(out.contains("Oranges | 30"));
    }

    #[tokio::test]
    async fn test_handle_chart_falls_back_to_outline() {
        let llm = Arc::new(MockLlmClient::scripted(["no spec here", "# Outline"]));
        let out = ConceptAgent::new(llm).handle("graph of nothing").await;
        assert!(out.starts_with("Error generating chart:"));
        assert!(out.ends_with("# Outline"));
    }

    #[tokio::test]
    async fn test_handle_outline() {
        let llm = Arc::new(MockLlmClient::scripted(["# Photosynthesis"]));
        let agent = ConceptAgent::new(llm.clone());
        assert_eq!(agent.handle("concept map of photosynthesis").await, "# Photosynthesis");
        assert!(llm.prompts()[0].contains("\"concept map of photosynthesis\""));
    }
}
