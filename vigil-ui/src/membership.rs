//! Video list projection over independently fetched collections
//!
//! The full video collection and the dangerous-content collection come from
//! two separate requests that can race, so the dangerous list is not a
//! subset of the full list by construction. Membership is a plain id
//! lookup and transient disagreement between the two (a flagged id missing
//! from the full list, or the reverse) is tolerated for the lifetime of the
//! view rather than reconciled.

use std::collections::HashSet;

use serde::Deserialize;

use vigil_common::models::VideoSummary;

/// Which projection of the video list to show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoFilter {
    #[default]
    All,
    Dangerous,
}

/// Full and dangerous collections with id membership for badge rendering
#[derive(Debug, Clone, Default)]
pub struct VideoListView {
    all: Vec<VideoSummary>,
    dangerous: Vec<VideoSummary>,
    flagged_ids: HashSet<i64>,
}

impl VideoListView {
    pub fn new(all: Vec<VideoSummary>, dangerous: Vec<VideoSummary>) -> Self {
        let flagged_ids = dangerous.iter().map(|v| v.id).collect();
        Self {
            all,
            dangerous,
            flagged_ids,
        }
    }

    /// Whether the video appears in the dangerous-content collection
    pub fn is_flagged(&self, video_id: i64) -> bool {
        self.flagged_ids.contains(&video_id)
    }

    /// The collection matching the requested projection. The dangerous
    /// projection shows the dangerous collection as fetched, not a filter
    /// of the full one.
    pub fn visible(&self, filter: VideoFilter) -> &[VideoSummary] {
        match filter {
            VideoFilter::All => &self.all,
            VideoFilter::Dangerous => &self.dangerous,
        }
    }

    pub fn all_count(&self) -> usize {
        self.all.len()
    }

    pub fn dangerous_count(&self) -> usize {
        self.dangerous.len()
    }
}
