//! Derived views over task snapshots and record view models
//!
//! Everything here is a pure projection: the same snapshot or record always
//! produces the same view. The store itself is never consulted directly.

use serde::Serialize;

use vigil_common::models::{PipelineStats, SourceAnalysis, TaskRecord, TaskStatus, VideoRecord};
use vigil_common::verdict::{self, FlaggedExamples, Verdict};

use crate::monitor::TaskSnapshot;

/// How many tasks the overview page shows
pub const OVERVIEW_RECENT_LIMIT: usize = 5;

/// Per-status task counts; every status key is always present, zero-filled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.completed + self.failed
    }

    /// Jobs still moving through the pipeline
    pub fn active(&self) -> usize {
        self.pending + self.in_progress
    }
}

impl TaskSnapshot {
    /// Tasks sorted newest-first by start time. The sort is stable, so
    /// tasks sharing a start time keep the order the backend delivered
    /// them in; task ids are opaque and never used as a tie-break.
    pub fn sorted_by_recency(&self) -> Vec<TaskRecord> {
        let mut tasks = self.tasks.clone();
        tasks.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        tasks
    }

    /// First `n` of `sorted_by_recency`
    pub fn recent(&self, n: usize) -> Vec<TaskRecord> {
        let mut tasks = self.sorted_by_recency();
        tasks.truncate(n);
        tasks
    }

    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for task in &self.tasks {
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }
}

/// Presentation model for one analyzed video: raw fields plus everything
/// derived from its analysis sources
#[derive(Debug, Clone, Serialize)]
pub struct VideoView {
    #[serde(flatten)]
    pub video: VideoRecord,

    pub verdict: Verdict,

    pub title_flagged: bool,
    pub comments_flagged: bool,
    pub transcripts_flagged: bool,

    /// Label of the first source that flagged content, in the fixed
    /// title/comments/transcription order; drives which detail tab the
    /// operator lands on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_flagged: Option<&'static str>,

    pub flagged_comments: FlaggedExamples,
}

fn source_flagged(source: Option<&SourceAnalysis>) -> bool {
    source.is_some_and(|s| s.is_dangerous)
}

impl VideoView {
    pub fn from_record(video: VideoRecord) -> Self {
        let sources = verdict::video_sources(&video);
        let verdict = verdict::aggregate(sources.iter().map(|(kind, source)| (*kind, *source)));

        let title_flagged = source_flagged(video.title_analysis.as_ref().map(|a| &a.results));
        let comments_flagged = source_flagged(video.comment_analysis.as_ref().map(|a| &a.results));
        let transcripts_flagged = video
            .transcriptions
            .iter()
            .any(|t| source_flagged(t.analysis.as_ref().map(|a| &a.results)));

        let first_flagged = sources
            .iter()
            .find(|(_, source)| source_flagged(*source))
            .map(|(kind, _)| kind.label());

        let flagged_comments =
            verdict::flagged_examples(video.comment_analysis.as_ref().map(|a| &a.results));

        Self {
            video,
            verdict,
            title_flagged,
            comments_flagged,
            transcripts_flagged,
            first_flagged,
            flagged_comments,
        }
    }
}

/// Landing-page composite: pipeline counters plus the freshest task slice
#[derive(Debug, Clone, Serialize)]
pub struct TaskOverview {
    pub stats: PipelineStats,
    pub counts: StatusCounts,
    pub recent: Vec<TaskRecord>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl TaskOverview {
    pub fn assemble(stats: PipelineStats, snapshot: &TaskSnapshot) -> Self {
        Self {
            stats,
            counts: snapshot.status_counts(),
            recent: snapshot.recent(OVERVIEW_RECENT_LIMIT),
            last_error: snapshot.last_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use vigil_common::models::{
        AnalysisAttachment, CategoryMatch, SourceAnalysis, TaskType, Transcription,
    };

    fn task(id: &str, status: TaskStatus, minute: u32) -> TaskRecord {
        TaskRecord {
            id: id.to_string(),
            task_type: TaskType::Video,
            status,
            start_time: NaiveDate::from_ymd_opt(2025, 11, 3)
                .unwrap()
                .and_hms_opt(10, minute, 0)
                .unwrap(),
            end_time: None,
            params: serde_json::Value::Null,
            error: None,
        }
    }

    fn snapshot(tasks: Vec<TaskRecord>) -> TaskSnapshot {
        TaskSnapshot {
            tasks,
            last_error: None,
            last_updated: None,
        }
    }

    #[test]
    fn test_sorted_by_recency_is_descending_permutation() {
        let snap = snapshot(vec![
            task("a", TaskStatus::Completed, 5),
            task("b", TaskStatus::Pending, 30),
            task("c", TaskStatus::Failed, 12),
        ]);

        let sorted = snap.sorted_by_recency();
        assert_eq!(sorted.len(), 3);

        let ids: Vec<&str> = sorted.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        for pair in sorted.windows(2) {
            assert!(pair[0].start_time >= pair[1].start_time);
        }
    }

    #[test]
    fn test_sorted_by_recency_ties_keep_insertion_order() {
        // Three tasks sharing one start time must come out in store order
        let snap = snapshot(vec![
            task("first", TaskStatus::Pending, 10),
            task("second", TaskStatus::Pending, 10),
            task("newer", TaskStatus::Pending, 20),
            task("third", TaskStatus::Pending, 10),
        ]);

        let sorted = snap.sorted_by_recency();
        let ids: Vec<&str> = sorted.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["newer", "first", "second", "third"]);
    }

    #[test]
    fn test_recent_limits_after_sorting() {
        let snap = snapshot(vec![
            task("old", TaskStatus::Completed, 1),
            task("mid", TaskStatus::Completed, 2),
            task("new", TaskStatus::Completed, 3),
        ]);

        let recent = snap.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, "new");
        assert_eq!(recent[1].id, "mid");

        // Asking for more than exists returns everything
        assert_eq!(snap.recent(10).len(), 3);
    }

    #[test]
    fn test_status_counts_sum_to_total() {
        let snap = snapshot(vec![
            task("a", TaskStatus::Pending, 1),
            task("b", TaskStatus::InProgress, 2),
            task("c", TaskStatus::InProgress, 3),
            task("d", TaskStatus::Failed, 4),
        ]);

        let counts = snap.status_counts();
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.in_progress, 2);
        assert_eq!(counts.completed, 0);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.total(), snap.tasks.len());
        assert_eq!(counts.active(), 3);
    }

    #[test]
    fn test_status_counts_all_keys_present_when_empty() {
        let counts = snapshot(vec![]).status_counts();
        let json = serde_json::to_value(counts).unwrap();

        for key in ["pending", "in_progress", "completed", "failed"] {
            assert_eq!(json[key], 0, "{} must be present and zero", key);
        }
    }

    fn dangerous(severity: u8, category: &str) -> AnalysisAttachment {
        let mut matches = BTreeMap::new();
        matches.insert(
            category.to_string(),
            CategoryMatch {
                severity,
                keywords: vec!["kw".to_string()],
                count: 1,
            },
        );
        AnalysisAttachment {
            highest_severity: severity,
            results: SourceAnalysis {
                is_dangerous: true,
                highest_severity: severity,
                dangerous_categories: vec![category.to_string()],
                matches,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_video_view_first_flagged_source() {
        let video = VideoRecord {
            id: 1,
            title: "t".to_string(),
            comment_analysis: Some(dangerous(3, "hate_speech")),
            transcriptions: vec![Transcription {
                analysis: Some(dangerous(2, "violence")),
                ..Default::default()
            }],
            ..Default::default()
        };

        let view = VideoView::from_record(video);
        assert!(!view.title_flagged);
        assert!(view.comments_flagged);
        assert!(view.transcripts_flagged);
        assert_eq!(view.first_flagged, Some("comments"));
        assert!(view.verdict.is_dangerous);
        assert_eq!(view.verdict.highest_severity, 3);
        assert_eq!(view.verdict.categories, vec!["hate_speech", "violence"]);
    }

    #[test]
    fn test_video_view_clean_video() {
        let view = VideoView::from_record(VideoRecord {
            id: 2,
            title: "fine".to_string(),
            ..Default::default()
        });

        assert!(!view.verdict.is_dangerous);
        assert!(view.first_flagged.is_none());
        assert!(view.flagged_comments.examples.is_empty());
    }

    #[test]
    fn test_overview_assembly() {
        let snap = snapshot(vec![
            task("a", TaskStatus::Completed, 1),
            task("b", TaskStatus::Pending, 2),
        ]);

        let overview = TaskOverview::assemble(PipelineStats::default(), &snap);
        assert_eq!(overview.recent.len(), 2);
        assert_eq!(overview.recent[0].id, "b");
        assert_eq!(overview.counts.total(), 2);
        assert!(overview.last_error.is_none());
    }
}
