//! TestPulse recording core
//!
//! Worker threads measure named actions around their own work; every
//! completed measurement is appended to the owning session, aggregated,
//! and persisted as one atomic JSON write so the dashboard can follow
//! along live.
//!
//! ```no_run
//! use testpulse_monitor::{MonitorConfig, PerformanceMonitor};
//!
//! let monitor = PerformanceMonitor::new(MonitorConfig::default());
//! monitor.enable(true);
//!
//! let mut ctx = monitor.start_session("Login Test");
//! {
//!     let _timer = monitor.measure(&mut ctx, "Login");
//!     // drive the browser...
//! }
//! monitor.end_session("Login Test");
//! ```

pub mod config;
pub mod context;
pub mod monitor;
pub mod report;
pub mod store;
pub mod timer;

pub use config::MonitorConfig;
pub use context::WorkerContext;
pub use monitor::PerformanceMonitor;
pub use report::{render_html_report, PerformanceReport};
pub use store::MetricsStore;
pub use timer::ActionTimer;
