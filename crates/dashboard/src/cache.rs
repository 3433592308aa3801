//! In-memory metrics cache
//!
//! Maps test identifier to the last session JSON loaded from disk.
//! Rebuilt wholesale by the initial directory scan, then replaced one
//! file at a time by watch events. Bad files are logged and skipped;
//! no single file may abort a scan.

use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tracing::{info, warn};

struct CachedSession {
    record: Value,
    /// Monotonic load sequence; highest wins for system_info queries
    seq: u64,
}

#[derive(Default)]
struct CacheInner {
    sessions: HashMap<String, CachedSession>,
    last_update: f64,
    next_seq: u64,
}

/// Dashboard-side metrics cache
#[derive(Default)]
pub struct MetricsCache {
    inner: RwLock<CacheInner>,
}

impl MetricsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load one metrics file into the cache, replacing that test's
    /// slot. Returns true when the cache changed. Empty files, invalid
    /// JSON, and documents without a test identifier are skipped with
    /// a warning.
    pub async fn load_file(&self, path: &Path) -> bool {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("could not read metrics file {}: {}", path.display(), e);
                return false;
            }
        };

        if content.trim().is_empty() {
            warn!("metrics file {} is empty, skipping", path.display());
            return false;
        }

        let record: Value = match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(e) => {
                warn!("invalid JSON in metrics file {}: {}", path.display(), e);
                return false;
            }
        };

        let Some(test_id) = record.get("test_case_id").and_then(Value::as_str) else {
            warn!("no test_case_id in metrics file {}", path.display());
            return false;
        };
        let test_id = test_id.to_string();

        let mut inner = self.inner.write().await;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.sessions.insert(test_id.clone(), CachedSession { record, seq });
        inner.last_update = unix_now();
        info!("Loaded metrics for {}", test_id);
        true
    }

    /// Load every suite metrics file in `dir`. Returns the number of
    /// sessions loaded; a missing directory loads nothing.
    pub async fn scan_dir(&self, dir: &Path) -> usize {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("could not scan {}: {}", dir.display(), e);
                return 0;
            }
        };

        let mut loaded = 0;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if testpulse_common::is_metrics_file(&path) && self.load_file(&path).await {
                loaded += 1;
            }
        }
        loaded
    }

    /// Full-cache snapshot in the wire shape pushed to viewers
    pub async fn snapshot(&self) -> Value {
        let inner = self.inner.read().await;
        let metrics: serde_json::Map<String, Value> = inner
            .sessions
            .iter()
            .map(|(id, cached)| (id.clone(), cached.record.clone()))
            .collect();
        serde_json::json!({
            "metrics": metrics,
            "last_update": inner.last_update,
        })
    }

    /// system_info of the most-recently-loaded session that has one.
    /// Deterministic under concurrent updates; empty object when no
    /// session carries one.
    pub async fn system_info(&self) -> Value {
        let inner = self.inner.read().await;
        inner
            .sessions
            .values()
            .filter(|c| c.record.get("system_info").is_some_and(|si| !si.is_null()))
            .max_by_key(|c| c.seq)
            .and_then(|c| c.record.get("system_info").cloned())
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()))
    }

    pub async fn last_update(&self) -> f64 {
        self.inner.read().await.last_update
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.sessions.is_empty()
    }
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn valid_metrics(test_id: &str) -> String {
        serde_json::json!({
            "test_case_id": test_id,
            "start_time": "2025-02-27T10:00:00",
            "actions": [],
            "system_info": {"os": "Linux", "os_version": "6.1", "cpu": "20.0%", "memory": "16.00 GB"},
            "execution_context": {"runner_version": "0.1.0", "language_version": "1.75", "browser": "chromium", "headless_mode": true},
            "status": "Running",
            "failures": 0,
            "summary": {}
        })
        .to_string()
    }

    #[tokio::test]
    async fn scan_skips_bad_files_without_failing() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("good_metrics.json"), valid_metrics("T1")).unwrap();
        std::fs::write(dir.path().join("empty_metrics.json"), "").unwrap();
        std::fs::write(dir.path().join("broken_metrics.json"), "{not json").unwrap();
        std::fs::write(dir.path().join("unrelated.txt"), "ignore me").unwrap();

        let cache = MetricsCache::new();
        let loaded = cache.scan_dir(dir.path()).await;

        assert_eq!(loaded, 1);
        assert_eq!(cache.len().await, 1);
        let snapshot = cache.snapshot().await;
        assert!(snapshot["metrics"].get("T1").is_some());
    }

    #[tokio::test]
    async fn missing_test_id_is_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("anon_metrics.json");
        std::fs::write(&path, r#"{"start_time": "2025-02-27T10:00:00"}"#).unwrap();

        let cache = MetricsCache::new();
        assert!(!cache.load_file(&path).await);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn reload_replaces_existing_slot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("suite_metrics.json");
        std::fs::write(&path, valid_metrics("T1")).unwrap();

        let cache = MetricsCache::new();
        cache.load_file(&path).await;
        let first_update = cache.last_update().await;

        std::fs::write(&path, valid_metrics("T1")).unwrap();
        cache.load_file(&path).await;

        assert_eq!(cache.len().await, 1);
        assert!(cache.last_update().await >= first_update);
    }

    #[tokio::test]
    async fn system_info_prefers_most_recent_load() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a_metrics.json");
        let b = dir.path().join("b_metrics.json");
        std::fs::write(&a, valid_metrics("A")).unwrap();

        let mut newer: Value = serde_json::from_str(&valid_metrics("B")).unwrap();
        newer["system_info"]["os"] = Value::String("Newest".to_string());
        std::fs::write(&b, newer.to_string()).unwrap();

        let cache = MetricsCache::new();
        cache.load_file(&a).await;
        cache.load_file(&b).await;

        assert_eq!(cache.system_info().await["os"], "Newest");
    }

    #[tokio::test]
    async fn system_info_empty_when_cache_empty() {
        let cache = MetricsCache::new();
        assert!(cache.is_empty().await);
        assert_eq!(cache.system_info().await, serde_json::json!({}));
    }
}
