//! TestPulse Common Library
//!
//! Shared types and utilities for the TestPulse telemetry platform.

pub mod error;
pub mod probe;
pub mod summary;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use probe::SystemProbe;
pub use summary::summarize;
pub use types::*;

/// TestPulse version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Filename suffix shared by the writer and the watcher
pub const METRICS_FILE_SUFFIX: &str = "_metrics.json";

/// Default results directory
pub fn default_results_dir() -> std::path::PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| std::path::PathBuf::from("."))
        .join("results")
}

/// Whether a filename follows the suite-metrics naming convention
pub fn is_metrics_file(path: &std::path::Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.ends_with(METRICS_FILE_SUFFIX))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn metrics_file_convention() {
        assert!(is_metrics_file(Path::new("/tmp/results/smoke_metrics.json")));
        assert!(!is_metrics_file(Path::new("/tmp/results/smoke.json")));
        assert!(!is_metrics_file(Path::new("/tmp/results")));
    }
}
