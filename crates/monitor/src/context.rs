//! Per-worker session context
//!
//! Each worker thread drives one test at a time and owns its own step
//! and failure counters. The context is passed explicitly to every
//! measurement call instead of living in thread-local storage, so the
//! model carries over to task-based runners unchanged.
//!
//! The failure counter sits behind a shared handle: an open
//! [`ActionTimer`](crate::ActionTimer) reads it when the region exits,
//! so a failure recorded inside the region still tags that action.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Per-worker measurement context. Not shared across threads.
#[derive(Debug)]
pub struct WorkerContext {
    test_name: String,
    step_order: u32,
    failures: Arc<AtomicU32>,
}

impl WorkerContext {
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            step_order: 0,
            failures: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Test identifier this worker is recording into
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Advance and return the 1-based step counter
    pub fn next_step(&mut self) -> u32 {
        self.step_order += 1;
        self.step_order
    }

    /// Current step counter without advancing
    pub fn step_order(&self) -> u32 {
        self.step_order
    }

    /// Mark one failed step for this worker's session
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }

    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    /// Handle an open measurement guard reads at region exit
    pub(crate) fn failure_handle(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.failures)
    }
}
