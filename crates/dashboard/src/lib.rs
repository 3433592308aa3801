//! TestPulse Live Dashboard
//!
//! Watches the results directory for suite metrics files and pushes the
//! full metrics cache to connected WebSocket viewers on every change.

pub mod cache;
pub mod server;
pub mod watcher;

pub use cache::MetricsCache;
pub use server::{serve, DashboardConfig, DashboardState};
