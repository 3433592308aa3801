//! Report generation
//!
//! The in-memory report is a read-only snapshot of one session. The
//! HTML report re-reads the persisted suite metrics file and injects
//! the snapshot JSON into a template file; how the template presents
//! the data is the template author's concern, this module only fixes
//! the shape of the data handed over.

use crate::config::MonitorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use testpulse_common::{
    ActionRecord, Error, ExecutionContext, Result, SessionRecord, SessionStatus, Summary,
    SystemInfo,
};
use tracing::info;

/// Placeholder the template must carry; replaced by the report JSON
pub const REPORT_DATA_PLACEHOLDER: &str = "{{REPORT_DATA}}";

/// Read-only session snapshot handed to viewers and templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub test_case_id: String,
    pub start_time: String,
    pub system_info: SystemInfo,
    pub execution_context: ExecutionContext,
    pub summary: Summary,
    pub actions: Vec<ActionRecord>,
    pub status: SessionStatus,
    pub failures: u32,
    pub current_time: String,
}

impl PerformanceReport {
    pub fn from_session(session: SessionRecord) -> Self {
        Self {
            test_case_id: session.test_case_id,
            start_time: session.start_time,
            system_info: session.system_info,
            execution_context: session.execution_context,
            summary: session.summary,
            actions: session.actions,
            status: session.status,
            failures: session.failures,
            current_time: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Render the suite HTML report next to the metrics file.
///
/// Fails with NotFound when the persisted metrics file or the template
/// is missing; the failure is local to this call.
pub fn render_html_report(config: &MonitorConfig) -> Result<PathBuf> {
    let metrics_path = config.metrics_path();
    if !metrics_path.exists() {
        return Err(Error::not_found(
            "metrics file",
            metrics_path.display().to_string(),
        ));
    }

    let session: SessionRecord = serde_json::from_str(&fs::read_to_string(&metrics_path)?)?;

    if !config.template_path.exists() {
        return Err(Error::not_found(
            "report template",
            config.template_path.display().to_string(),
        ));
    }
    let template = fs::read_to_string(&config.template_path)?;

    let report = PerformanceReport::from_session(session);
    let html = template.replace(
        REPORT_DATA_PLACEHOLDER,
        &serde_json::to_string_pretty(&report)?,
    );

    let report_path = config.report_path();
    fs::write(&report_path, html)?;
    info!("Performance report saved to {}", report_path.display());
    Ok(report_path)
}
