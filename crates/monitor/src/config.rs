//! Monitor configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use testpulse_common::{ExecutionContext, METRICS_FILE_SUFFIX};

/// Monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Directory the suite metrics file is written to
    pub results_dir: PathBuf,

    /// Suite grouping key; names the persisted metrics file
    pub suite_name: String,

    /// HTML report template file
    pub template_path: PathBuf,

    /// Browser kind the suite drives
    pub browser: String,

    /// Whether the browser runs headless
    pub headless: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            results_dir: testpulse_common::default_results_dir(),
            suite_name: "default_suite".to_string(),
            template_path: std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("templates")
                .join("performance_report_template.html"),
            browser: "chromium".to_string(),
            headless: false,
        }
    }
}

impl MonitorConfig {
    /// Path of the persisted suite metrics file
    pub fn metrics_path(&self) -> PathBuf {
        self.results_dir
            .join(format!("{}{}", self.suite_name, METRICS_FILE_SUFFIX))
    }

    /// Path the rendered HTML report is written to
    pub fn report_path(&self) -> PathBuf {
        self.results_dir
            .join(format!("{}_performance_report.html", self.suite_name))
    }

    /// Execution-context snapshot for new sessions
    pub fn execution_context(&self) -> ExecutionContext {
        ExecutionContext {
            runner_version: testpulse_common::VERSION.to_string(),
            language_version: env!("CARGO_PKG_RUST_VERSION").to_string(),
            browser: self.browser.clone(),
            headless_mode: self.headless,
        }
    }
}
