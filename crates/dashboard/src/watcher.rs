//! Results-directory watcher
//!
//! Starts Idle: one full scan of the results directory fills the cache.
//! Then Watching: create/modify events on `*_metrics.json` reload that
//! one file and trigger a broadcast of the whole cache. The returned
//! watcher handle must stay alive for as long as events are wanted.

use crate::server::DashboardState;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use testpulse_common::{Error, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Whether a filesystem event should trigger a reload
fn is_relevant(event: &Event) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event.paths.iter().any(|p| testpulse_common::is_metrics_file(p))
}

/// Scan `dir`, then watch it non-recursively for metrics-file changes.
pub async fn spawn(dir: &Path, state: Arc<DashboardState>) -> Result<RecommendedWatcher> {
    tokio::fs::create_dir_all(dir).await?;

    let loaded = state.cache().scan_dir(dir).await;
    info!("Initial scan loaded {} session(s) from {}", loaded, dir.display());

    let (tx, mut rx) = mpsc::channel::<Event>(64);
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            // Dropped events only delay the next broadcast; the full
            // cache goes out on every delivery anyway.
            let _ = tx.blocking_send(event);
        }
        Err(e) => warn!("watch error: {}", e),
    })
    .map_err(|e| Error::Watch(e.to_string()))?;

    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .map_err(|e| Error::Watch(e.to_string()))?;
    info!("Watching {} for metrics files", dir.display());

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if !is_relevant(&event) {
                continue;
            }
            let metrics_paths: Vec<PathBuf> = event
                .paths
                .iter()
                .filter(|p| testpulse_common::is_metrics_file(p))
                .cloned()
                .collect();

            let mut changed = false;
            for path in metrics_paths {
                debug!("metrics file event: {}", path.display());
                if state.cache().load_file(&path).await {
                    changed = true;
                }
            }
            if changed {
                state.broadcast().await;
            }
        }
        debug!("watch channel closed");
    });

    Ok(watcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn create_and_modify_on_metrics_files_are_relevant() {
        assert!(is_relevant(&event(
            EventKind::Create(CreateKind::File),
            "/results/smoke_metrics.json"
        )));
        assert!(is_relevant(&event(
            EventKind::Modify(ModifyKind::Any),
            "/results/smoke_metrics.json"
        )));
    }

    #[test]
    fn other_events_and_files_are_ignored() {
        assert!(!is_relevant(&event(
            EventKind::Remove(RemoveKind::File),
            "/results/smoke_metrics.json"
        )));
        assert!(!is_relevant(&event(
            EventKind::Create(CreateKind::File),
            "/results/notes.txt"
        )));
    }
}
