//! Performance monitor orchestrator
//!
//! One explicitly constructed instance per process, passed by handle to
//! every call site. Worker threads each hold their own
//! [`WorkerContext`]; the session store behind the monitor is shared
//! and serializes all mutation under its lock.

use crate::config::MonitorConfig;
use crate::context::WorkerContext;
use crate::report::PerformanceReport;
use crate::store::MetricsStore;
use crate::timer::ActionTimer;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use testpulse_common::{Result, SystemProbe};
use tracing::{debug, info};

/// Process-wide performance monitor. Disabled until [`enable`] is
/// called; while disabled every operation is a silent no-op.
///
/// [`enable`]: PerformanceMonitor::enable
pub struct PerformanceMonitor {
    enabled: AtomicBool,
    store: MetricsStore,
    probe: SystemProbe,
}

impl PerformanceMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            store: MetricsStore::new(config),
            probe: SystemProbe::new(),
        }
    }

    /// Turn monitoring on or off
    pub fn enable(&self, enable: bool) {
        self.enabled.store(enable, Ordering::SeqCst);
        info!(
            "Performance monitoring {}",
            if enable { "enabled" } else { "disabled" }
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &MonitorConfig {
        self.store.config()
    }

    pub(crate) fn store(&self) -> &MetricsStore {
        &self.store
    }

    pub(crate) fn probe(&self) -> &SystemProbe {
        &self.probe
    }

    /// Start a session for `test_name` and hand back the worker's
    /// context. Repeated starts for the same identifier keep the
    /// existing session data; a disabled monitor returns an inert
    /// context and touches nothing.
    pub fn start_session(&self, test_name: &str) -> WorkerContext {
        if !self.is_enabled() {
            debug!("monitoring disabled, not starting session {}", test_name);
            return WorkerContext::new(test_name);
        }

        self.store.create_or_get(
            test_name,
            self.probe.system_info(),
            self.config().execution_context(),
        );
        WorkerContext::new(test_name)
    }

    /// Open a measured region for one named action. The returned guard
    /// records the action when it goes out of scope.
    pub fn measure(&self, ctx: &mut WorkerContext, action: &str) -> ActionTimer<'_> {
        self.measure_with(ctx, action, HashMap::new())
    }

    /// [`measure`] with caller-supplied parameters attached to the
    /// recorded action.
    ///
    /// [`measure`]: PerformanceMonitor::measure
    pub fn measure_with(
        &self,
        ctx: &mut WorkerContext,
        action: &str,
        parameters: HashMap<String, serde_json::Value>,
    ) -> ActionTimer<'_> {
        if !self.is_enabled() {
            return ActionTimer::disabled();
        }

        let step_order = ctx.next_step();
        debug!("Measuring action: {} - step {}", action, step_order);
        ActionTimer::start(
            self,
            ctx.test_name().to_string(),
            action.to_string(),
            parameters,
            step_order,
            ctx.failure_handle(),
        )
    }

    /// Mark the session Completed and persist its final state. Unknown
    /// identifiers and a disabled monitor are tolerated silently.
    pub fn end_session(&self, test_name: &str) {
        if !self.is_enabled() {
            return;
        }
        self.store.end(test_name);
    }

    /// Mark every session Completed and persist them all
    pub fn save_all(&self) {
        if !self.is_enabled() {
            debug!("monitoring disabled, no metrics to save");
            return;
        }
        self.store.save_all();
    }

    /// Read-only report snapshot for one session. None when monitoring
    /// is disabled or the identifier is unknown.
    pub fn generate_report(&self, test_name: &str) -> Option<PerformanceReport> {
        if !self.is_enabled() {
            return None;
        }
        self.store.get(test_name).map(PerformanceReport::from_session)
    }

    /// Render the suite's HTML report from the persisted metrics file.
    /// Ok(None) when monitoring is disabled; NotFound when the metrics
    /// file or the template is missing.
    pub fn generate_html_report(&self) -> Result<Option<PathBuf>> {
        if !self.is_enabled() {
            info!("monitoring disabled, no HTML report generated");
            return Ok(None);
        }
        crate::report::render_html_report(self.config()).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use testpulse_common::SessionStatus;

    fn test_monitor(dir: &std::path::Path) -> PerformanceMonitor {
        PerformanceMonitor::new(MonitorConfig {
            results_dir: dir.to_path_buf(),
            suite_name: "unit".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn disabled_monitor_touches_nothing() {
        let dir = tempdir().unwrap();
        let monitor = test_monitor(dir.path());

        let mut ctx = monitor.start_session("T1");
        {
            let timer = monitor.measure(&mut ctx, "Login");
            assert!(!timer.is_recording());
        }
        monitor.end_session("T1");
        monitor.save_all();

        assert!(monitor.generate_report("T1").is_none());
        assert_eq!(ctx.step_order(), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn measured_actions_land_in_order() {
        let dir = tempdir().unwrap();
        let monitor = test_monitor(dir.path());
        monitor.enable(true);

        let mut ctx = monitor.start_session("T1");
        {
            let _t = monitor.measure(&mut ctx, "Login");
        }
        {
            let _t = monitor.measure(&mut ctx, "Navigate");
        }
        monitor.end_session("T1");

        let report = monitor.generate_report("T1").unwrap();
        assert_eq!(report.actions.len(), 2);
        assert_eq!(report.actions[0].step_order, 1);
        assert_eq!(report.actions[1].step_order, 2);
        assert_eq!(report.actions[0].action, "Login");
        assert_eq!(report.status, SessionStatus::Completed);
        assert_eq!(report.summary["Login"].count, 1);
    }

    #[test]
    fn repeated_start_keeps_existing_session() {
        let dir = tempdir().unwrap();
        let monitor = test_monitor(dir.path());
        monitor.enable(true);

        let mut ctx = monitor.start_session("T1");
        {
            let _t = monitor.measure(&mut ctx, "Login");
        }
        let _ctx2 = monitor.start_session("T1");

        let report = monitor.generate_report("T1").unwrap();
        assert_eq!(report.actions.len(), 1);
    }

    #[test]
    fn failed_steps_get_fail_outcome() {
        let dir = tempdir().unwrap();
        let monitor = test_monitor(dir.path());
        monitor.enable(true);

        let mut ctx = monitor.start_session("T1");
        ctx.record_failure();
        {
            let _t = monitor.measure(&mut ctx, "Login");
        }
        {
            let _t = monitor.measure(&mut ctx, "Navigate");
        }

        let report = monitor.generate_report("T1").unwrap();
        assert_eq!(report.actions[0].result, Some(testpulse_common::Outcome::Fail));
        assert_eq!(report.actions[1].result, Some(testpulse_common::Outcome::Pass));
        assert_eq!(report.failures, 1);
    }

    #[test]
    fn failure_inside_measured_region_tags_that_action() {
        let dir = tempdir().unwrap();
        let monitor = test_monitor(dir.path());
        monitor.enable(true);

        let mut ctx = monitor.start_session("T1");
        {
            let _t = monitor.measure(&mut ctx, "Login");
            // The measured work itself fails; the outcome is derived
            // at region exit, after this is recorded.
            ctx.record_failure();
        }

        let report = monitor.generate_report("T1").unwrap();
        assert_eq!(report.actions[0].result, Some(testpulse_common::Outcome::Fail));
        assert_eq!(report.failures, 1);
    }
}
