//! Task polling monitor and store
//!
//! The monitor owns a repeating timer that fetches the full task collection
//! and replaces the store contents wholesale each cycle; there is no
//! partial merge, so a task absent from a later poll is simply no longer
//! tracked. A failed poll keeps the previous snapshot (last-known-good) and
//! records the error; the timer keeps running and the next successful cycle
//! clears it.
//!
//! Each cycle takes a sequence number before awaiting the fetch, and the
//! store only applies results newer than the last applied cycle. That same
//! guard makes an in-flight fetch completing after `stop()` a no-op.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use vigil_common::models::TaskRecord;

use crate::backend::BackendClient;

/// Point-in-time view of the task store
#[derive(Debug, Clone, Default)]
pub struct TaskSnapshot {
    /// Task records in the arrival order of the last successful poll
    pub tasks: Vec<TaskRecord>,

    /// Error from the most recent poll, if it failed
    pub last_error: Option<String>,

    /// When the last successful poll was applied
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct StoreInner {
    snapshot: TaskSnapshot,
    applied_seq: u64,
}

/// Last-known-good task state, written only by the owning monitor
#[derive(Clone, Default)]
pub struct TaskStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cheap clone of the current snapshot; readers never observe a
    /// half-applied replace
    pub async fn snapshot(&self) -> TaskSnapshot {
        self.inner.read().await.snapshot.clone()
    }

    /// Replace the store contents if `seq` is newer than the last applied
    /// cycle. Returns whether the replace happened.
    pub(crate) async fn replace(&self, seq: u64, tasks: Vec<TaskRecord>) -> bool {
        let mut inner = self.inner.write().await;
        if seq <= inner.applied_seq {
            return false;
        }
        inner.applied_seq = seq;
        inner.snapshot.tasks = tasks;
        inner.snapshot.last_error = None;
        inner.snapshot.last_updated = Some(Utc::now());
        true
    }

    /// Record a failed cycle. The previous task list stays intact; only the
    /// error marker changes.
    pub(crate) async fn record_failure(&self, seq: u64, error: String) -> bool {
        let mut inner = self.inner.write().await;
        if seq <= inner.applied_seq {
            return false;
        }
        inner.applied_seq = seq;
        inner.snapshot.last_error = Some(error);
        true
    }
}

/// Background service polling the backend's task collection
pub struct TaskMonitor {
    backend: Arc<BackendClient>,
    store: TaskStore,
    cancel: CancellationToken,
    seq: AtomicU64,
}

impl TaskMonitor {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self {
            backend,
            store: TaskStore::new(),
            cancel: CancellationToken::new(),
            seq: AtomicU64::new(0),
        }
    }

    /// Handle to the store this monitor writes
    pub fn store(&self) -> TaskStore {
        self.store.clone()
    }

    /// Spawn the polling loop: one poll immediately, then one per interval.
    /// Missed ticks are skipped rather than bursted.
    pub fn start(self: Arc<Self>, interval: Duration) {
        let monitor = self;
        info!(interval_ms = interval.as_millis() as u64, "Task monitor started");

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = monitor.cancel.cancelled() => {
                        info!("Task monitor stopped");
                        break;
                    }
                    _ = timer.tick() => {
                        monitor.poll_once().await;
                    }
                }
            }
        });
    }

    /// One poll cycle: full fetch, then atomic replace (or error record)
    pub async fn poll_once(&self) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;

        match self.backend.fetch_tasks().await {
            Ok(tasks) => {
                if self.cancel.is_cancelled() {
                    debug!(cycle = seq, "Dropping poll result after stop");
                    return;
                }
                if self.store.replace(seq, tasks).await {
                    debug!(cycle = seq, "Task store refreshed");
                } else {
                    debug!(cycle = seq, "Stale poll result dropped");
                }
            }
            Err(e) => {
                if self.cancel.is_cancelled() {
                    return;
                }
                warn!(cycle = seq, error = %e, "Task poll failed; keeping last snapshot");
                self.store.record_failure(seq, e.to_string()).await;
            }
        }
    }

    /// Cancel the polling timer. In-flight fetch completions become no-ops;
    /// the store is never mutated after this returns and the loop exits.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use vigil_common::models::{TaskStatus, TaskType};

    fn task(id: &str, minute: u32) -> TaskRecord {
        TaskRecord {
            id: id.to_string(),
            task_type: TaskType::Video,
            status: TaskStatus::Pending,
            start_time: NaiveDate::from_ymd_opt(2025, 11, 3)
                .unwrap()
                .and_hms_opt(10, minute, 0)
                .unwrap(),
            end_time: None,
            params: serde_json::Value::Null,
            error: None,
        }
    }

    #[tokio::test]
    async fn test_replace_supersedes_older_cycles() {
        let store = TaskStore::new();

        assert!(store.replace(2, vec![task("new", 1)]).await);

        // A slower, older cycle arriving late must be dropped
        assert!(!store.replace(1, vec![task("old", 0)]).await);

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.tasks.len(), 1);
        assert_eq!(snapshot.tasks[0].id, "new");
    }

    #[tokio::test]
    async fn test_failure_keeps_last_known_good() {
        let store = TaskStore::new();
        store
            .replace(1, vec![task("a", 0), task("b", 1), task("c", 2)])
            .await;

        assert!(store.record_failure(2, "connection refused".to_string()).await);

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.tasks.len(), 3, "snapshot must survive a failed poll");
        assert_eq!(snapshot.last_error.as_deref(), Some("connection refused"));

        // Next successful poll clears the error and may change the count
        store.replace(3, vec![task("a", 0)]).await;
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.tasks.len(), 1);
        assert!(snapshot.last_error.is_none());
    }

    #[tokio::test]
    async fn test_stale_failure_does_not_clobber_newer_success() {
        let store = TaskStore::new();
        store.replace(2, vec![task("a", 0)]).await;

        assert!(!store.record_failure(1, "slow error".to_string()).await);
        assert!(store.snapshot().await.last_error.is_none());
    }
}
