//! Wire envelope types for the analysis backend API
//!
//! Every backend response wraps its payload in a `status` envelope; error
//! responses are `{status: "error", message}` with a 4xx/5xx code. The
//! console consumes this contract, it does not define it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{
    ChannelRecord, ChannelSummary, PipelineStats, TaskRecord, VideoRecord, VideoSummary,
};

fn default_true() -> bool {
    true
}

fn default_max_videos() -> u32 {
    5
}

/// `GET /tasks`: the full job collection, keyed by task id
///
/// The map preserves the backend's delivery order. Task ids are opaque and
/// not comparable, so that order is the only defined one and downstream
/// sorting uses it to break ties.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TasksResponse {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub tasks: IndexMap<String, TaskRecord>,
}

/// `GET /tasks/{id}`: one job plus its opaque results blob, if finished
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskDetailResponse {
    pub task: TaskRecord,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,
}

/// `GET /channels`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChannelsResponse {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub channels: Vec<ChannelSummary>,
}

/// `GET /channels/{id}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelResponse {
    #[serde(default)]
    pub status: String,

    pub channel: ChannelRecord,
}

/// `GET /videos/{id}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoResponse {
    #[serde(default)]
    pub status: String,

    pub video: VideoRecord,
}

/// `GET /stats`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub stats: PipelineStats,
}

/// `GET /analysis/dangerous-videos`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DangerousVideosResponse {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub videos: Vec<VideoSummary>,
}

/// `POST /process/channel` request body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessChannelRequest {
    /// Channel handle, id, or URL
    pub channel_input: String,

    #[serde(default = "default_max_videos")]
    pub max_videos: u32,

    #[serde(default = "default_true")]
    pub scrape_comments: bool,
}

/// `POST /process/video` request body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessVideoRequest {
    pub video_url: String,

    #[serde(default = "default_true")]
    pub scrape_comments: bool,
}

/// Response to either submission endpoint; the job is observed afterwards
/// only through `GET /tasks` polling
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessAccepted {
    #[serde(default)]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub task_id: String,
}

/// Backend error body
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub message: String,
}
