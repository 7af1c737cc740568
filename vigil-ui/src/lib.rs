//! vigil-ui library - Operator Console for the VIGIL pipeline
//!
//! The console keeps a live view of backend analysis jobs through a
//! polling monitor, loads per-task detail on demand with stale-response
//! protection, and derives per-video danger verdicts from the backend's
//! per-source analyses. The HTTP surface built here only exposes that
//! derived state.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod backend;
pub mod config;
pub mod detail;
pub mod membership;
pub mod monitor;
pub mod views;

use backend::BackendClient;
use detail::TaskDetailLoader;
use monitor::TaskMonitor;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
    pub monitor: Arc<TaskMonitor>,
    pub loader: Arc<TaskDetailLoader>,
}

impl AppState {
    /// Wire the engine around one backend client. Each console instance
    /// owns its monitor and loader; nothing is shared across instances.
    pub fn new(backend: Arc<BackendClient>) -> Self {
        let monitor = Arc::new(TaskMonitor::new(Arc::clone(&backend)));
        let loader = Arc::new(TaskDetailLoader::new(Arc::clone(&backend)));
        Self {
            backend,
            monitor,
            loader,
        }
    }
}

/// Build the operator router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health_check))
        .route("/api/overview", get(api::get_overview))
        .route("/api/tasks", get(api::get_tasks))
        .route(
            "/api/selection",
            get(api::get_selection).put(api::put_selection),
        )
        .route("/api/videos", get(api::get_videos))
        .route("/api/videos/:id", get(api::get_video))
        .route("/api/channels", get(api::get_channels))
        .route("/api/channels/:id", get(api::get_channel))
        .route("/api/process/channel", post(api::submit_channel))
        .route("/api/process/video", post(api::submit_video))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
