//! Core types for TestPulse
//!
//! Field names follow the persisted metrics file contract: one JSON
//! document per suite, consumed by the dashboard and the HTML report.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Outcome of a single measured action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Pass,
    Fail,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Pass => write!(f, "PASS"),
            Outcome::Fail => write!(f, "FAIL"),
        }
    }
}

/// Session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Running,
    Completed,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::Running
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Running => write!(f, "Running"),
            SessionStatus::Completed => write!(f, "Completed"),
        }
    }
}

/// One timed action within a session. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Action name (aggregation key)
    pub action: String,
    /// Wall-clock start, ISO-8601
    pub start_time: String,
    /// Duration in seconds, measured on the monotonic clock
    pub duration: f64,
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
    /// 1-based, strictly increasing per worker
    pub step_order: u32,
    /// CPU usage snapshot, e.g. "23.0%"
    pub cpu_usage: String,
    /// Used memory snapshot, e.g. "345.67 MB"
    pub memory_usage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Outcome>,
}

/// Host snapshot captured once per session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub os_version: String,
    /// CPU usage at capture time, e.g. "30.0%"
    pub cpu: String,
    /// Total memory, e.g. "16.00 GB"
    pub memory: String,
}

/// Runner environment captured once per session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub runner_version: String,
    pub language_version: String,
    pub browser: String,
    pub headless_mode: bool,
}

/// Derived per-action-name statistics. Never stored independently;
/// recomputed from the full action list on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStat {
    pub count: u64,
    pub total_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
    pub avg_duration: f64,
}

/// Per-action-name aggregates keyed by action name
pub type Summary = BTreeMap<String, SummaryStat>;

/// One test session's metrics record, keyed by test identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub test_case_id: String,
    pub start_time: String,
    /// Append-only; insertion order matches step order within a worker
    pub actions: Vec<ActionRecord>,
    pub system_info: SystemInfo,
    pub execution_context: ExecutionContext,
    pub status: SessionStatus,
    pub failures: u32,
    #[serde(default)]
    pub summary: Summary,
}

impl SessionRecord {
    /// Create a fresh Running session with empty action list
    pub fn new(test_case_id: String, system_info: SystemInfo, execution_context: ExecutionContext) -> Self {
        Self {
            test_case_id,
            start_time: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            actions: Vec::new(),
            system_info,
            execution_context,
            status: SessionStatus::Running,
            failures: 0,
            summary: Summary::new(),
        }
    }
}
