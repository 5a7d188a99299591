//! 用量持久化：单个 JSON 文件记录累计 token、累计费用与按日用量
//!
//! 每次 record 后立即写盘；写盘失败只记日志，不影响对话流程。
//! 写盘在持锁期间完成，先写临时文件再 rename，文件内容始终是某一次完整快照。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::core::AgentError;
use crate::usage::UsageSink;

/// 用量快照（即文件内容）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub total_cost: f64,
    /// "YYYY-MM-DD" -> 当日 token 数
    #[serde(default)]
    pub daily_usage: BTreeMap<String, u64>,
}

/// 文件用量统计
#[derive(Debug)]
pub struct FileUsageTracker {
    path: PathBuf,
    cost_per_1k_tokens: f64,
    state: Mutex<UsageSnapshot>,
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

impl FileUsageTracker {
    /// 打开用量文件；文件不存在时从零开始，内容损坏时报错
    pub fn open(path: impl AsRef<Path>, cost_per_1k_tokens: f64) -> Result<Self, AgentError> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            serde_json::from_str(&data)?
        } else {
            UsageSnapshot::default()
        };
        Ok(Self {
            path,
            cost_per_1k_tokens,
            state: Mutex::new(state),
        })
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// 按给定 token 数计算费用
    pub fn cost_of(&self, tokens: u64) -> f64 {
        tokens as f64 / 1000.0 * self.cost_per_1k_tokens
    }

    /// 记入指定日期并写盘
    pub fn record_on(&self, date: &str, tokens: u64) -> Result<(), AgentError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.total_tokens += tokens;
        *state.daily_usage.entry(date.to_string()).or_insert(0) += tokens;
        state.total_cost = self.cost_of(state.total_tokens);
        self.save(&state)
    }

    /// 调用方须持有 state 锁
    fn save(&self, snapshot: &UsageSnapshot) -> Result<(), AgentError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .and_then(|_| std::fs::rename(&tmp, &self.path))
            .map_err(|e| AgentError::Usage(format!("{}: {}", self.path.display(), e)))
    }

    /// 用量摘要：累计 token、累计费用、今日用量
    pub fn summary(&self) -> String {
        let state = self.snapshot();
        let today_tokens = state.daily_usage.get(&today()).copied().unwrap_or(0);
        format!(
            "Usage Summary:\n-------------\nTotal Tokens: {}\nTotal Cost: ${:.4}\nToday's Usage: {} tokens",
            state.total_tokens, state.total_cost, today_tokens
        )
    }
}

impl UsageSink for FileUsageTracker {
    fn record(&self, tokens: u64) {
        if let Err(e) = self.record_on(&today(), tokens) {
            tracing::warn!(error = %e, "failed to persist usage");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = FileUsageTracker::open(dir.path().join("usage.json"), 0.002).unwrap();
        assert_eq!(tracker.snapshot(), UsageSnapshot::default());
    }

    #[test]
    fn test_record_accumulates_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.json");
        let tracker = FileUsageTracker::open(&path, 0.002).unwrap();
        tracker.record_on("2024-05-01", 1500).unwrap();
        tracker.record_on("2024-05-01", 500).unwrap();
        tracker.record_on("2024-05-02", 1000).unwrap();

        let reopened = FileUsageTracker::open(&path, 0.002).unwrap();
        let snap = reopened.snapshot();
        assert_eq!(snap.total_tokens, 3000);
        assert!((snap.total_cost - 0.006).abs() < 1e-9);
        assert_eq!(snap.daily_usage.get("2024-05-01"), Some(&2000));
        assert_eq!(snap.daily_usage.get("2024-05-02"), Some(&1000));
    }

    #[test]
    fn test_loads_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.json");
        std::fs::write(&path, r#"{"total_tokens": 42}"#).unwrap();
        let tracker = FileUsageTracker::open(&path, 0.002).unwrap();
        assert_eq!(tracker.snapshot().total_tokens, 42);
        assert!(tracker.snapshot().daily_usage.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(FileUsageTracker::open(&path, 0.002).is_err());
    }

    #[test]
    fn test_concurrent_records_all_reach_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.json");
        let tracker = Arc::new(FileUsageTracker::open(&path, 0.002).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        tracker.record_on("2024-05-01", 1).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tracker.snapshot().total_tokens, 400);
        let reopened = FileUsageTracker::open(&path, 0.002).unwrap();
        assert_eq!(reopened.snapshot().total_tokens, 400);
        assert_eq!(reopened.snapshot().daily_usage.get("2024-05-01"), Some(&400));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_sink_records_today() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = FileUsageTracker::open(dir.path().join("usage.json"), 0.002).unwrap();
        tracker.record(10);
        assert_eq!(tracker.snapshot().daily_usage.get(&today()), Some(&10));
        assert!(tracker.summary().contains("Today's Usage: 10 tokens"));
    }
}
