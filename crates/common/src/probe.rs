//! Host resource probing
//!
//! sysinfo-backed snapshots of CPU and memory usage. One probe instance
//! is shared by all workers; sysinfo wants refresh calls serialized, so
//! the `System` handle sits behind a mutex.

use crate::types::SystemInfo;
use parking_lot::Mutex;
use sysinfo::System;

const BYTES_PER_MB: f64 = 1_048_576.0;
const BYTES_PER_GB: f64 = 1_073_741_824.0;

/// Shared system probe
pub struct SystemProbe {
    sys: Mutex<System>,
}

impl SystemProbe {
    pub fn new() -> Self {
        Self {
            sys: Mutex::new(System::new_all()),
        }
    }

    /// One-shot host snapshot for a new session
    pub fn system_info(&self) -> SystemInfo {
        let mut sys = self.sys.lock();
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        SystemInfo {
            os: System::name().unwrap_or_else(|| "unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "unknown".to_string()),
            cpu: format!("{:.1}%", sys.global_cpu_usage()),
            memory: format!("{:.2} GB", sys.total_memory() as f64 / BYTES_PER_GB),
        }
    }

    /// Current CPU usage, formatted as "<number>%"
    pub fn cpu_usage(&self) -> String {
        let mut sys = self.sys.lock();
        sys.refresh_cpu_usage();
        format!("{:.1}%", sys.global_cpu_usage())
    }

    /// Current used memory, formatted as "<number> MB"
    pub fn memory_usage(&self) -> String {
        let mut sys = self.sys.lock();
        sys.refresh_memory();
        format!("{:.2} MB", sys.used_memory() as f64 / BYTES_PER_MB)
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}
