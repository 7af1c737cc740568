//! Data model for pipeline jobs and their analyzed outputs
//!
//! These types mirror the JSON bodies served by the analysis backend. The
//! console never mutates a record it received; everything here is re-read
//! wholesale on the next fetch. Optional analysis fields deserialize with
//! permissive defaults so a partially populated record degrades instead of
//! failing the whole response.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::timefmt;

// ========================================
// Tasks
// ========================================

/// Lifecycle state of one backend analysis job
///
/// Transitions are pending → in_progress → {completed, failed}. The backend
/// reports freshly submitted jobs as `queued` until the worker picks them
/// up; that is accepted as an alias of `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[serde(alias = "queued")]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    /// Whether the job has reached a final state
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// What a job operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Channel,
    Video,
}

/// One asynchronous backend job (scrape + analyze a channel or a video)
///
/// `GET /tasks` returns a mapping of task id → record; the record itself
/// carries no id on the wire, so the client attaches the map key during
/// normalization. `end_time` is present iff the status is terminal, and
/// `error` only when the job failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Opaque backend-issued id (the `GET /tasks` map key)
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type")]
    pub task_type: TaskType,

    pub status: TaskStatus,

    #[serde(with = "timefmt::wire")]
    pub start_time: NaiveDateTime,

    #[serde(default, with = "timefmt::wire_opt", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveDateTime>,

    /// Opaque submission parameters (channel_input / video_url / ...)
    #[serde(default)]
    pub params: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskRecord {
    /// Display label for the job's subject, pulled out of the opaque params
    pub fn subject(&self) -> Option<&str> {
        self.params
            .get("channel_input")
            .or_else(|| self.params.get("video_url"))
            .and_then(Value::as_str)
    }
}

// ========================================
// Content analysis
// ========================================

/// Evidence for one matched danger category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMatch {
    /// Assessed risk level, 0 (none) to 4 (highest)
    #[serde(default)]
    pub severity: u8,

    /// Keywords that triggered the match
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Number of occurrences found
    #[serde(default)]
    pub count: u32,
}

/// Classifier output for one text source (title, aggregate comments, or a
/// single transcript segment)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceAnalysis {
    #[serde(default)]
    pub is_dangerous: bool,

    /// Max severity over `matches`, 0 when nothing matched
    #[serde(default)]
    pub highest_severity: u8,

    /// Flagged category ids, in the classifier's reporting order
    #[serde(default)]
    pub dangerous_categories: Vec<String>,

    /// Per-category evidence, keyed by category id
    #[serde(default)]
    pub matches: BTreeMap<String, CategoryMatch>,

    /// Comment-level sources only: the individual flagged comments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dangerous_comments: Vec<FlaggedComment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dangerous_comment_count: Option<u32>,
}

/// One comment flagged by the comment-level classifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlaggedComment {
    #[serde(default)]
    pub comment_data: CommentData,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<SourceAnalysis>,
}

/// Author/text/date triple attached to a flagged comment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentData {
    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Stored analysis row wrapping the classifier results for one source
///
/// Title and comment attachments arrive as `{id, highest_severity, results}`;
/// transcription attachments additionally carry `is_dangerous`. The inner
/// `results` record is authoritative for danger state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisAttachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_dangerous: Option<bool>,

    #[serde(default)]
    pub highest_severity: u8,

    #[serde(default)]
    pub results: SourceAnalysis,
}

// ========================================
// Videos
// ========================================

/// Owning channel reference embedded in a video record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelRef {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub name: String,
}

/// Full video record with per-source analyses attached
///
/// A video's danger state is never stored here; it is always derived from
/// the attached analyses (see `verdict::aggregate_video`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: i64,

    #[serde(default)]
    pub video_id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    #[serde(default)]
    pub channel: ChannelRef,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_analysis: Option<AnalysisAttachment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_analysis: Option<AnalysisAttachment>,

    #[serde(default)]
    pub transcriptions: Vec<Transcription>,

    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// One transcript segment, optionally with its own analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisAttachment>,
}

/// One scraped viewer comment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default)]
    pub is_verified: bool,

    #[serde(default)]
    pub is_pinned: bool,
}

/// Summary form of a video as listed under a channel or in the
/// dangerous-content listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<i64>,

    /// Present on dangerous-content rows, which join through a channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,

    /// Which source the dangerous-content row was flagged on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_severity: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_summary: Option<AnalysisSummary>,
}

/// Category digest attached to a dangerous-content row
///
/// Unlike the full per-source `matches` mapping, these rows carry only a
/// flat category list with no occurrence counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    #[serde(default)]
    pub categories: Vec<CategorySummary>,
}

/// One category entry in a dangerous-content digest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub severity: u8,

    #[serde(default)]
    pub keywords: Vec<String>,
}

// ========================================
// Channels
// ========================================

/// Channel as listed by `GET /channels`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub id: i64,

    #[serde(default)]
    pub channel_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribers: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrape_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Full channel record including its video summaries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub id: i64,

    #[serde(default)]
    pub channel_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribers: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrape_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    #[serde(default)]
    pub videos: Vec<VideoSummary>,
}

// ========================================
// Stats
// ========================================

/// Pipeline-wide counters from `GET /stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineStats {
    #[serde(default)]
    pub channels_count: u64,

    #[serde(default)]
    pub videos_count: u64,

    #[serde(default)]
    pub transcriptions_count: u64,

    #[serde(default)]
    pub dangerous_content_count: u64,

    #[serde(default)]
    pub dangerous_titles_count: u64,

    #[serde(default)]
    pub dangerous_comments_count: u64,

    #[serde(default)]
    pub active_tasks: u64,

    #[serde(default)]
    pub queued_tasks: u64,

    #[serde(default)]
    pub completed_tasks: u64,

    #[serde(default)]
    pub failed_tasks: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_time: Option<String>,
}
