//! Wikipedia 检索：MediaWiki API 搜索 + 摘要提取
//!
//! 先用 list=search 取前 top_k 个标题，再用 prop=extracts（纯文本导语）取摘要，
//! 拼成 "Page: ...\nSummary: ..." 块；总长度超过 max_chars 时截断并追加 ...[truncated]。
//! 无结果时返回空串，由调用方按「信息缺口」处理。

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::WikipediaSection;
use crate::tools::{FactLookup, LookupError};

/// 查询词最大长度（MediaWiki 对过长搜索词直接报错）
const MAX_QUERY_CHARS: usize = 300;

const USER_AGENT: &str = concat!("waggle/", env!("CARGO_PKG_VERSION"), " (multi-agent chatbot)");

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    title: String,
    #[serde(default)]
    extract: Option<String>,
}

/// Wikipedia 检索实现
pub struct WikipediaLookup {
    client: Client,
    api_url: String,
    top_k_results: usize,
    max_chars: usize,
}

impl WikipediaLookup {
    pub fn new(language: &str, top_k_results: usize, max_chars: usize, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_url: format!("https://{}.wikipedia.org/w/api.php", language),
            top_k_results: top_k_results.max(1),
            max_chars,
        }
    }

    pub fn from_config(cfg: &WikipediaSection) -> Self {
        Self::new(&cfg.language, cfg.top_k_results, cfg.max_chars, cfg.timeout_secs)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, LookupError> {
        let resp = self
            .client
            .get(&self.api_url)
            .query(params)
            .send()
            .await
            .map_err(|e| LookupError::Request(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(LookupError::Http(resp.status().as_u16()));
        }
        resp.json::<T>()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<String>, LookupError> {
        let limit = self.top_k_results.to_string();
        let resp: SearchResponse = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("format", "json"),
                ("srsearch", query),
                ("srlimit", &limit),
            ])
            .await?;
        Ok(resp
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    async fn page_summary(&self, title: &str) -> Result<Option<(String, String)>, LookupError> {
        let resp: ExtractResponse = self
            .get_json(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("format", "json"),
                ("titles", title),
            ])
            .await?;
        Ok(resp
            .query
            .and_then(|q| q.pages.into_values().next())
            .and_then(|page| {
                page.extract
                    .filter(|e| !e.trim().is_empty())
                    .map(|e| (page.title, e.trim().to_string()))
            }))
    }
}

/// 按字符数截断，超长时追加标记
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        text.chars().take(max_chars).collect::<String>() + "\n...[truncated]"
    } else {
        text.to_string()
    }
}

#[async_trait]
impl FactLookup for WikipediaLookup {
    async fn search(&self, query: &str) -> Result<String, LookupError> {
        let query: String = query.trim().chars().take(MAX_QUERY_CHARS).collect();
        if query.is_empty() {
            return Ok(String::new());
        }
        tracing::info!(query = %query, "wikipedia lookup");

        let titles = self.search_titles(&query).await?;
        let mut blocks = Vec::with_capacity(titles.len());
        for title in titles {
            match self.page_summary(&title).await {
                Ok(Some((page, summary))) => {
                    blocks.push(format!("Page: {}\nSummary: {}", page, summary))
                }
                Ok(None) => {}
                // 单页失败不影响其它结果
                Err(e) => tracing::warn!(title = %title, error = %e, "wikipedia page fetch failed"),
            }
        }

        Ok(truncate_chars(&blocks.join("\n\n"), self.max_chars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        let out = truncate_chars("abcdefghij", 4);
        assert_eq!(out, "abcd\n...[truncated]");
    }

    #[test]
    fn test_api_url_uses_language() {
        let lookup = WikipediaLookup::new("de", 3, 4000, 5);
        assert_eq!(lookup.api_url, "https://de.wikipedia.org/w/api.php");
    }

    #[test]
    fn test_parse_search_response() {
        let body = r#"{"batchcomplete":"","query":{"search":[{"ns":0,"title":"Paris","pageid":22989},{"ns":0,"title":"France","pageid":5843419}]}}"#;
        let resp: SearchResponse = serde_json::from_str(body).unwrap();
        let titles: Vec<_> = resp.query.unwrap().search.into_iter().map(|h| h.title).collect();
        assert_eq!(titles, vec!["Paris", "France"]);
    }

    #[test]
    fn test_parse_extract_response() {
        let body = r#"{"query":{"pages":{"22989":{"pageid":22989,"ns":0,"title":"Paris","extract":"Paris is the capital of France."}}}}"#;
        let resp: ExtractResponse = serde_json::from_str(body).unwrap();
        let page = resp.query.unwrap().pages.into_values().next().unwrap();
        assert_eq!(page.title, "Paris");
        assert_eq!(page.extract.as_deref(), Some("Paris is the capital of France."));
    }

    #[tokio::test]
    async fn test_empty_query_skips_request() {
        let lookup = WikipediaLookup::new("en", 3, 4000, 1);
        assert_eq!(lookup.search("   ").await.unwrap(), "");
    }
}
