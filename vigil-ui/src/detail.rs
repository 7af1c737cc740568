//! Race-safe on-demand task detail loading
//!
//! Detail fetches are driven by operator selection, not by the poll timer.
//! Selections can change while a fetch is in flight, so every fetch carries
//! a request token taken at selection time; a response whose token no
//! longer matches is discarded instead of overwriting the detail panel for
//! a task that is no longer selected. Detail failures stay local to the
//! panel and never disturb the task list.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use vigil_common::models::TaskRecord;

use crate::backend::BackendClient;

/// Detail panel state for the currently selected task
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetailState {
    /// Id of the selected task, if any
    pub selected: Option<String>,

    /// Whether the panel is shown (re-selecting toggles this)
    pub visible: bool,

    /// A fetch for the selection is still in flight
    pub loading: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskRecord>,

    /// Opaque results blob for completed tasks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Loads one task's detail on selection, discarding stale responses
pub struct TaskDetailLoader {
    backend: Arc<BackendClient>,
    state: RwLock<DetailState>,
    token: AtomicU64,
}

impl TaskDetailLoader {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self {
            backend,
            state: RwLock::new(DetailState::default()),
            token: AtomicU64::new(0),
        }
    }

    pub async fn state(&self) -> DetailState {
        self.state.read().await.clone()
    }

    /// Drive the selection.
    ///
    /// - `None` clears the panel and invalidates any in-flight fetch.
    /// - Re-selecting the current id toggles visibility without a refetch.
    /// - A new id starts a fetch; if the selection moves on before the
    ///   response lands, the response is dropped.
    pub async fn select(&self, task_id: Option<String>) {
        let Some(task_id) = task_id else {
            self.token.fetch_add(1, Ordering::SeqCst);
            let mut state = self.state.write().await;
            *state = DetailState::default();
            debug!("Selection cleared");
            return;
        };

        let token = {
            let mut state = self.state.write().await;

            if state.selected.as_deref() == Some(task_id.as_str()) {
                state.visible = !state.visible;
                debug!(task_id = %task_id, visible = state.visible, "Selection toggled");
                return;
            }

            let token = self.token.fetch_add(1, Ordering::SeqCst) + 1;
            *state = DetailState {
                selected: Some(task_id.clone()),
                visible: true,
                loading: true,
                ..Default::default()
            };
            token
        };

        // Fetch outside the lock; other selections may proceed meanwhile
        let result = self.backend.fetch_task(&task_id).await;

        let mut state = self.state.write().await;
        if self.token.load(Ordering::SeqCst) != token {
            debug!(task_id = %task_id, "Discarding stale detail response");
            return;
        }

        state.loading = false;
        match result {
            Ok(detail) => {
                state.task = Some(detail.task);
                state.results = detail.results;
            }
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "Detail fetch failed");
                state.error = Some(e.to_string());
            }
        }
    }
}
