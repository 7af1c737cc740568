//! Analysis backend API client
//!
//! Thin reqwest wrapper over the backend's JSON contract. Every call is a
//! plain request/response; the console keeps no connection state beyond the
//! pooled HTTP client. Failures are surfaced as `BackendError` and handled
//! by the caller (the monitor retains its last snapshot, handlers map them
//! to error responses).

use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;

use vigil_common::api::{
    ChannelResponse, ChannelsResponse, DangerousVideosResponse, ErrorBody, ProcessAccepted,
    ProcessChannelRequest, ProcessVideoRequest, StatsResponse, TaskDetailResponse, TasksResponse,
    VideoResponse,
};
use vigil_common::models::{
    ChannelRecord, ChannelSummary, PipelineStats, TaskRecord, VideoRecord, VideoSummary,
};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("vigil-ui/", env!("CARGO_PKG_VERSION"));

/// Backend client errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error {0}: {1}")]
    Api(u16, String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// HTTP client for the analysis backend
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the backend at `base_url` (including the `/api`
    /// prefix, e.g. `http://127.0.0.1:5001/api`)
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Backend request");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Self::decode(response, path).await
    }

    async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Backend submission");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Self::decode(response, path).await
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        path: &str,
    ) -> Result<T, BackendError> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(path.to_string()));
        }

        if !status.is_success() {
            // Error bodies are {status: "error", message}
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.message)
                .unwrap_or_default();
            return Err(BackendError::Api(status.as_u16(), message));
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    /// Fetch the full task collection, normalized into a list with the map
    /// key attached as each record's id. The list keeps the backend's
    /// delivery order; ids are opaque, so that order is the tie-break for
    /// recency sorting.
    pub async fn fetch_tasks(&self) -> Result<Vec<TaskRecord>, BackendError> {
        let body: TasksResponse = self.get_json("/tasks").await?;

        let mut tasks = Vec::with_capacity(body.tasks.len());
        for (id, mut task) in body.tasks {
            task.id = id;
            tasks.push(task);
        }

        tracing::debug!(count = tasks.len(), "Fetched task collection");
        Ok(tasks)
    }

    /// Fetch one task's full detail, including its opaque results blob
    pub async fn fetch_task(&self, task_id: &str) -> Result<TaskDetailResponse, BackendError> {
        let mut detail: TaskDetailResponse =
            self.get_json(&format!("/tasks/{}", task_id)).await?;
        detail.task.id = task_id.to_string();
        Ok(detail)
    }

    pub async fn fetch_channels(&self) -> Result<Vec<ChannelSummary>, BackendError> {
        let body: ChannelsResponse = self.get_json("/channels").await?;
        Ok(body.channels)
    }

    pub async fn fetch_channel(&self, channel_id: i64) -> Result<ChannelRecord, BackendError> {
        let body: ChannelResponse = self.get_json(&format!("/channels/{}", channel_id)).await?;
        Ok(body.channel)
    }

    pub async fn fetch_video(&self, video_id: i64) -> Result<VideoRecord, BackendError> {
        let body: VideoResponse = self.get_json(&format!("/videos/{}", video_id)).await?;
        Ok(body.video)
    }

    pub async fn fetch_stats(&self) -> Result<PipelineStats, BackendError> {
        let body: StatsResponse = self.get_json("/stats").await?;
        Ok(body.stats)
    }

    /// Fetch the dangerous-content listing, optionally restricted to one
    /// source type (`title`, `comments`, `transcription`)
    pub async fn fetch_dangerous_videos(
        &self,
        content_type: Option<&str>,
    ) -> Result<Vec<VideoSummary>, BackendError> {
        let path = match content_type {
            Some(kind) => format!("/analysis/dangerous-videos?content_type={}", kind),
            None => "/analysis/dangerous-videos".to_string(),
        };
        let body: DangerousVideosResponse = self.get_json(&path).await?;
        Ok(body.videos)
    }

    /// Assemble the full video collection. The backend has no all-videos
    /// endpoint, so this walks the channel list and concatenates each
    /// channel's video summaries.
    pub async fn fetch_all_videos(&self) -> Result<Vec<VideoSummary>, BackendError> {
        let channels = self.fetch_channels().await?;

        let mut videos = Vec::new();
        for channel in &channels {
            let detail = self.fetch_channel(channel.id).await?;
            videos.extend(detail.videos);
        }

        tracing::debug!(
            channels = channels.len(),
            videos = videos.len(),
            "Assembled full video collection"
        );
        Ok(videos)
    }

    /// Submit a channel for analysis; the job is tracked afterwards only
    /// through task polling
    pub async fn submit_channel(
        &self,
        request: &ProcessChannelRequest,
    ) -> Result<ProcessAccepted, BackendError> {
        let accepted: ProcessAccepted = self.post_json("/process/channel", request).await?;
        tracing::info!(task_id = %accepted.task_id, channel = %request.channel_input, "Channel analysis submitted");
        Ok(accepted)
    }

    /// Submit a single video for analysis
    pub async fn submit_video(
        &self,
        request: &ProcessVideoRequest,
    ) -> Result<ProcessAccepted, BackendError> {
        let accepted: ProcessAccepted = self.post_json("/process/video", request).await?;
        tracing::info!(task_id = %accepted.task_id, video = %request.video_url, "Video analysis submitted");
        Ok(accepted)
    }

    /// Liveness probe against the backend
    pub async fn health(&self) -> Result<(), BackendError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(BackendError::Api(status.as_u16(), "health check failed".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = BackendClient::new("http://127.0.0.1:5001/api");
        assert!(client.is_ok());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = BackendClient::new("http://127.0.0.1:5001/api/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:5001/api");
    }
}
