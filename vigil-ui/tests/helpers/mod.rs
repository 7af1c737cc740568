//! Shared test helpers: a scriptable stand-in for the analysis backend
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::RwLock;

/// Scriptable mock of the analysis backend. Tests mutate the fields to
/// steer responses between polls.
#[derive(Default)]
pub struct MockBackend {
    /// The task map served by GET /api/tasks
    pub tasks: RwLock<Value>,

    /// Force GET /api/tasks to return 500
    pub fail_tasks: AtomicBool,

    /// Artificial latency for GET /api/tasks, milliseconds
    pub tasks_delay_ms: AtomicU64,

    /// Artificial latency per task id for GET /api/tasks/:id
    pub detail_delay_ms: RwLock<HashMap<String, u64>>,

    /// Hit counter for GET /api/tasks/:id
    pub detail_requests: AtomicU64,

    /// Channel summaries served by GET /api/channels
    pub channels: RwLock<Value>,

    /// Full channel records by id
    pub channel_details: RwLock<HashMap<i64, Value>>,

    /// Full video records by id
    pub videos: RwLock<HashMap<i64, Value>>,

    /// Rows served by GET /api/analysis/dangerous-videos
    pub dangerous: RwLock<Value>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        let mock = Self::default();
        Arc::new(Self {
            tasks: RwLock::new(json!({})),
            channels: RwLock::new(json!([])),
            dangerous: RwLock::new(json!([])),
            ..mock
        })
    }

    pub async fn set_tasks(&self, tasks: Value) {
        *self.tasks.write().await = tasks;
    }
}

/// One wire-shaped task entry for the mock's task map
pub fn task_entry(task_type: &str, status: &str, start_time: &str) -> Value {
    json!({
        "type": task_type,
        "status": status,
        "start_time": start_time,
        "params": {"video_url": "https://example.com/watch?v=abc"}
    })
}

/// Bind the mock on an ephemeral port and serve it in the background
pub async fn spawn(mock: Arc<MockBackend>) -> SocketAddr {
    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/tasks", get(get_tasks))
        .route("/api/tasks/:id", get(get_task))
        .route("/api/channels", get(get_channels))
        .route("/api/channels/:id", get(get_channel))
        .route("/api/videos/:id", get(get_video))
        .route("/api/stats", get(get_stats))
        .route("/api/analysis/dangerous-videos", get(get_dangerous))
        .route("/api/process/channel", post(process_channel))
        .route("/api/process/video", post(process_video))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Backend base URL for a spawned mock
pub fn base_url(addr: SocketAddr) -> String {
    format!("http://{}/api", addr)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn get_tasks(State(mock): State<Arc<MockBackend>>) -> Response {
    let delay = mock.tasks_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if mock.fail_tasks.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"status": "error", "message": "database locked"})),
        )
            .into_response();
    }

    let tasks = mock.tasks.read().await.clone();
    Json(json!({"status": "success", "tasks": tasks})).into_response()
}

async fn get_task(
    State(mock): State<Arc<MockBackend>>,
    Path(task_id): Path<String>,
) -> Response {
    mock.detail_requests.fetch_add(1, Ordering::SeqCst);

    let delay = mock
        .detail_delay_ms
        .read()
        .await
        .get(&task_id)
        .copied()
        .unwrap_or(0);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let tasks = mock.tasks.read().await;
    match tasks.get(&task_id) {
        Some(task) => Json(json!({
            "task": task,
            "results": {"videos_processed": 1}
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"status": "error", "message": "Task not found"})),
        )
            .into_response(),
    }
}

async fn get_channels(State(mock): State<Arc<MockBackend>>) -> Json<Value> {
    let channels = mock.channels.read().await.clone();
    Json(json!({"status": "success", "channels": channels}))
}

async fn get_channel(
    State(mock): State<Arc<MockBackend>>,
    Path(channel_id): Path<i64>,
) -> Response {
    match mock.channel_details.read().await.get(&channel_id) {
        Some(channel) => {
            Json(json!({"status": "success", "channel": channel})).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"status": "error", "message": "Channel not found"})),
        )
            .into_response(),
    }
}

async fn get_video(
    State(mock): State<Arc<MockBackend>>,
    Path(video_id): Path<i64>,
) -> Response {
    match mock.videos.read().await.get(&video_id) {
        Some(video) => Json(json!({"status": "success", "video": video})).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"status": "error", "message": "Video not found"})),
        )
            .into_response(),
    }
}

async fn get_stats() -> Json<Value> {
    Json(json!({
        "status": "success",
        "stats": {
            "channels_count": 2,
            "videos_count": 11,
            "dangerous_content_count": 3,
            "active_tasks": 1
        }
    }))
}

async fn get_dangerous(State(mock): State<Arc<MockBackend>>) -> Json<Value> {
    let videos = mock.dangerous.read().await.clone();
    Json(json!({"status": "success", "videos": videos}))
}

async fn process_channel(Json(body): Json<Value>) -> Response {
    if body.get("channel_input").and_then(Value::as_str).is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"status": "error", "message": "Missing required parameter: channel_input"})),
        )
            .into_response();
    }
    Json(json!({
        "status": "success",
        "message": "Channel processing queued",
        "task_id": "mock-channel-task"
    }))
    .into_response()
}

async fn process_video(Json(body): Json<Value>) -> Response {
    if body.get("video_url").and_then(Value::as_str).is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"status": "error", "message": "Missing required parameter: video_url"})),
        )
            .into_response();
    }
    Json(json!({
        "status": "success",
        "message": "Video processing queued",
        "task_id": "mock-video-task"
    }))
    .into_response()
}
