//! Operator HTTP surface over the derived-state engine
//!
//! Handlers only assemble derived state; every non-trivial rule lives in
//! the monitor, loader, aggregator, and view modules. Backend failures map
//! to JSON error bodies: 404 for missing resources, 502 when the backend
//! itself is unreachable or erroring.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use vigil_common::api::{ProcessChannelRequest, ProcessVideoRequest};
use vigil_common::models::TaskRecord;

use crate::backend::BackendError;
use crate::membership::{VideoFilter, VideoListView};
use crate::views::{StatusCounts, TaskOverview, VideoView};
use crate::AppState;

/// Operator API errors
#[derive(Debug)]
pub enum ApiError {
    Backend(BackendError),
}

impl From<BackendError> for ApiError {
    fn from(e: BackendError) -> Self {
        ApiError::Backend(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Backend(BackendError::NotFound(path)) => {
                (StatusCode::NOT_FOUND, format!("Not found: {}", path))
            }
            ApiError::Backend(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
        };

        let body = Json(json!({
            "status": "error",
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
///
/// Health check endpoint for monitoring. Does not touch the backend.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "vigil-ui".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/overview
///
/// Pipeline counters plus the freshest task slice for the landing page.
pub async fn get_overview(State(state): State<AppState>) -> Result<Json<TaskOverview>, ApiError> {
    let stats = state.backend.fetch_stats().await?;
    let snapshot = state.monitor.store().snapshot().await;
    Ok(Json(TaskOverview::assemble(stats, &snapshot)))
}

/// Task list response: sorted records plus derived counts
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskRecord>,
    pub counts: StatusCounts,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
}

/// Query parameters for the task list
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    /// Cap the list to the newest `limit` tasks
    pub limit: Option<usize>,
}

/// GET /api/tasks
///
/// The current store snapshot, sorted newest-first. Served from memory;
/// freshness is bounded by the poll interval.
pub async fn get_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> Json<TaskListResponse> {
    let snapshot = state.monitor.store().snapshot().await;

    let tasks = match query.limit {
        Some(limit) => snapshot.recent(limit),
        None => snapshot.sorted_by_recency(),
    };

    Json(TaskListResponse {
        tasks,
        counts: snapshot.status_counts(),
        last_error: snapshot.last_error.clone(),
        last_updated: snapshot.last_updated,
    })
}

/// PUT /api/selection body
#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    /// Task to select; null or absent clears the selection
    #[serde(default)]
    pub task_id: Option<String>,
}

/// GET /api/selection
///
/// Current detail panel state.
pub async fn get_selection(State(state): State<AppState>) -> Response {
    Json(state.loader.state().await).into_response()
}

/// PUT /api/selection
///
/// Drive the detail loader: select a task, toggle the current one, or
/// clear with null. Returns the panel state after the selection settles.
pub async fn put_selection(
    State(state): State<AppState>,
    Json(request): Json<SelectionRequest>,
) -> Response {
    state.loader.select(request.task_id).await;
    Json(state.loader.state().await).into_response()
}

/// Query parameters for the video list
#[derive(Debug, Default, Deserialize)]
pub struct VideoListQuery {
    #[serde(default)]
    pub filter: VideoFilter,
}

/// One row of the video list with its membership badge
#[derive(Debug, Serialize)]
pub struct VideoListItem {
    #[serde(flatten)]
    pub video: vigil_common::models::VideoSummary,
    pub flagged: bool,
}

/// Video list response
#[derive(Debug, Serialize)]
pub struct VideoListResponse {
    pub filter: String,
    pub all_count: usize,
    pub dangerous_count: usize,
    pub videos: Vec<VideoListItem>,
}

/// GET /api/videos?filter=all|dangerous
///
/// Both collections are fetched per request and may briefly disagree; the
/// flagged badge is a pure membership lookup, never reconciled.
pub async fn get_videos(
    State(state): State<AppState>,
    Query(query): Query<VideoListQuery>,
) -> Result<Json<VideoListResponse>, ApiError> {
    let all = state.backend.fetch_all_videos().await?;
    let dangerous = state.backend.fetch_dangerous_videos(None).await?;
    let view = VideoListView::new(all, dangerous);

    let videos = view
        .visible(query.filter)
        .iter()
        .map(|video| VideoListItem {
            flagged: view.is_flagged(video.id),
            video: video.clone(),
        })
        .collect();

    Ok(Json(VideoListResponse {
        filter: match query.filter {
            VideoFilter::All => "all".to_string(),
            VideoFilter::Dangerous => "dangerous".to_string(),
        },
        all_count: view.all_count(),
        dangerous_count: view.dangerous_count(),
        videos,
    }))
}

/// GET /api/videos/:id
///
/// Full video record with its aggregated verdict and per-source flags.
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<i64>,
) -> Result<Json<VideoView>, ApiError> {
    let video = state.backend.fetch_video(video_id).await?;
    Ok(Json(VideoView::from_record(video)))
}

/// GET /api/channels
pub async fn get_channels(State(state): State<AppState>) -> Result<Response, ApiError> {
    let channels = state.backend.fetch_channels().await?;
    Ok(Json(json!({ "channels": channels })).into_response())
}

/// GET /api/channels/:id
pub async fn get_channel(
    State(state): State<AppState>,
    Path(channel_id): Path<i64>,
) -> Result<Response, ApiError> {
    let channel = state.backend.fetch_channel(channel_id).await?;
    Ok(Json(json!({ "channel": channel })).into_response())
}

/// POST /api/process/channel
///
/// Submission pass-through; the new task shows up via polling.
pub async fn submit_channel(
    State(state): State<AppState>,
    Json(request): Json<ProcessChannelRequest>,
) -> Result<Response, ApiError> {
    let accepted = state.backend.submit_channel(&request).await?;
    Ok((StatusCode::ACCEPTED, Json(accepted)).into_response())
}

/// POST /api/process/video
pub async fn submit_video(
    State(state): State<AppState>,
    Json(request): Json<ProcessVideoRequest>,
) -> Result<Response, ApiError> {
    let accepted = state.backend.submit_video(&request).await?;
    Ok((StatusCode::ACCEPTED, Json(accepted)).into_response())
}
