//! Scoped action measurement
//!
//! An `ActionTimer` is handed out by [`PerformanceMonitor::measure`]
//! and records the wrapped region when it drops, so the measurement
//! completes even when the wrapped work panics out of the scope.
//! Recording failures are logged and swallowed: telemetry must never
//! break the action being measured.

use crate::monitor::PerformanceMonitor;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;
use testpulse_common::{ActionRecord, Outcome};
use tracing::warn;

/// RAII guard for one measured action
pub struct ActionTimer<'a> {
    inner: Option<TimerInner<'a>>,
}

struct TimerInner<'a> {
    monitor: &'a PerformanceMonitor,
    test_id: String,
    action: String,
    parameters: HashMap<String, serde_json::Value>,
    step_order: u32,
    /// Live view of the worker's failure counter; read at region exit
    /// so failures recorded inside the region tag this action.
    failures: Arc<AtomicU32>,
    wall_start: String,
    started: Instant,
}

impl<'a> ActionTimer<'a> {
    /// No-op guard for disabled monitoring
    pub(crate) fn disabled() -> Self {
        Self { inner: None }
    }

    pub(crate) fn start(
        monitor: &'a PerformanceMonitor,
        test_id: String,
        action: String,
        parameters: HashMap<String, serde_json::Value>,
        step_order: u32,
        failures: Arc<AtomicU32>,
    ) -> Self {
        Self {
            inner: Some(TimerInner {
                monitor,
                test_id,
                action,
                parameters,
                step_order,
                failures,
                wall_start: chrono::Local::now()
                    .format("%Y-%m-%dT%H:%M:%S%.6f")
                    .to_string(),
                started: Instant::now(),
            }),
        }
    }

    /// Whether this guard will record anything on exit
    pub fn is_recording(&self) -> bool {
        self.inner.is_some()
    }
}

impl Drop for ActionTimer<'_> {
    fn drop(&mut self) {
        let Some(inner) = self.inner.take() else {
            return;
        };

        let duration = inner.started.elapsed().as_secs_f64();
        let failures = inner.failures.load(Ordering::SeqCst);
        let result = if inner.step_order <= failures {
            Outcome::Fail
        } else {
            Outcome::Pass
        };

        let record = ActionRecord {
            action: inner.action,
            start_time: inner.wall_start,
            duration,
            parameters: inner.parameters,
            step_order: inner.step_order,
            cpu_usage: inner.monitor.probe().cpu_usage(),
            memory_usage: inner.monitor.probe().memory_usage(),
            result: Some(result),
        };

        if let Err(e) = inner
            .monitor
            .store()
            .append_action(&inner.test_id, record, failures)
        {
            warn!("failed to record action for {}: {}", inner.test_id, e);
        }
    }
}
