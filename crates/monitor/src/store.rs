//! Session store
//!
//! Owns the map from test identifier to session record. All mutation
//! (append, summary recompute, persist) happens inside one critical
//! section per call so a watcher on the far side of the filesystem can
//! never observe a half-updated session.

use crate::config::MonitorConfig;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use testpulse_common::{
    summarize, ActionRecord, Error, ExecutionContext, Result, SessionRecord, SessionStatus,
    SystemInfo,
};
use tracing::{debug, info, warn};

/// Thread-safe container for all in-flight session records
pub struct MetricsStore {
    config: MonitorConfig,
    sessions: Mutex<HashMap<String, SessionRecord>>,
}

impl MetricsStore {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Create a session on first call for the identifier; later calls
    /// return the existing record untouched (first-write-wins).
    pub fn create_or_get(
        &self,
        test_id: &str,
        system_info: SystemInfo,
        execution_context: ExecutionContext,
    ) -> SessionRecord {
        let mut sessions = self.sessions.lock();
        sessions
            .entry(test_id.to_string())
            .or_insert_with(|| {
                info!("Starting session for {}", test_id);
                SessionRecord::new(test_id.to_string(), system_info, execution_context)
            })
            .clone()
    }

    /// Append one action, refresh the failure count, recompute the
    /// summary from the full list, and persist. One atomic unit under
    /// the store lock.
    pub fn append_action(&self, test_id: &str, action: ActionRecord, failures: u32) -> Result<()> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(test_id)
            .ok_or_else(|| Error::not_found("session", test_id))?;

        session.actions.push(action);
        session.failures = failures;
        session.summary = summarize(&session.actions);
        self.persist_record(session)
    }

    /// Mark a session Completed and persist. Ending an unknown session
    /// is tolerated; ending a Completed one is an idempotent re-save.
    pub fn end(&self, test_id: &str) {
        let mut sessions = self.sessions.lock();
        let Some(session) = sessions.get_mut(test_id) else {
            warn!("end called for unknown session {}", test_id);
            return;
        };

        session.status = SessionStatus::Completed;
        session.summary = summarize(&session.actions);
        if let Err(e) = self.persist_record(session) {
            warn!("failed to persist session {}: {}", test_id, e);
        } else {
            info!("Session {} completed and metrics saved", test_id);
        }
    }

    /// Persist one session by identifier
    pub fn persist(&self, test_id: &str) -> Result<()> {
        let sessions = self.sessions.lock();
        let session = sessions
            .get(test_id)
            .ok_or_else(|| Error::not_found("session", test_id))?;
        self.persist_record(session)
    }

    /// Mark every session Completed, refresh summaries, persist each
    pub fn save_all(&self) {
        let mut sessions = self.sessions.lock();
        for (test_id, session) in sessions.iter_mut() {
            session.status = SessionStatus::Completed;
            session.summary = summarize(&session.actions);
            if let Err(e) = self.persist_record(session) {
                warn!("failed to persist session {}: {}", test_id, e);
            }
        }
    }

    /// Read-only snapshot of one session
    pub fn get(&self, test_id: &str) -> Option<SessionRecord> {
        self.sessions.lock().get(test_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    // Serialize to a temp file in the results directory, then rename
    // over the suite metrics file. A concurrent reader sees either the
    // previous complete document or the new one, never a torn write.
    fn persist_record(&self, session: &SessionRecord) -> Result<()> {
        fs::create_dir_all(&self.config.results_dir)?;

        let path = self.config.metrics_path();
        let tmp = tempfile::NamedTempFile::new_in(&self.config.results_dir)?;
        serde_json::to_writer_pretty(tmp.as_file(), session)?;
        tmp.persist(&path).map_err(|e| Error::Io(e.error))?;

        debug!("Metrics saved to {}", path.display());
        Ok(())
    }
}
