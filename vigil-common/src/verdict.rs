//! Multi-source risk aggregation
//!
//! A video carries several independently classified text sources (title,
//! aggregate comments, per-transcript segments). This module reduces them
//! into one combined verdict for display. The reduction is a pure function:
//! same input, same output, no hidden state.
//!
//! Sources are always processed in a fixed order: title, then comments,
//! then transcriptions in array order. Category de-duplication keeps
//! first-seen order across that sequence, and per-category evidence is
//! taken from the first source reporting the category. Later sources'
//! evidence for the same category is never merged or summed; display
//! stability depends on this exact behavior.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{CategoryMatch, FlaggedComment, SourceAnalysis, VideoRecord};

/// Maximum flagged comments surfaced as examples
pub const FLAGGED_EXAMPLE_LIMIT: usize = 5;

/// Which text surface a source analysis came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Title,
    Comments,
    /// One transcript segment, by position in the video's transcription list
    Transcription(usize),
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Title => "title",
            SourceKind::Comments => "comments",
            SourceKind::Transcription(_) => "transcription",
        }
    }
}

/// Combined danger summary for one video
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Verdict {
    pub is_dangerous: bool,

    /// Max severity across all dangerous sources, 0 when none
    pub highest_severity: u8,

    /// Union of flagged categories, first-seen order preserved
    pub categories: Vec<String>,

    /// Evidence per category, from the first source reporting it
    pub per_category: BTreeMap<String, CategoryMatch>,
}

impl Verdict {
    /// The verdict for a video with no dangerous sources
    pub fn neutral() -> Self {
        Self::default()
    }
}

/// Reduce an ordered sequence of source analyses into one verdict.
///
/// Absent sources and sources that did not flag anything are discarded
/// first; everything else follows the caller's order. A category listed in
/// `dangerous_categories` but missing from every surviving `matches`
/// mapping degrades to empty evidence rather than failing the reduction.
pub fn aggregate<'a, I>(sources: I) -> Verdict
where
    I: IntoIterator<Item = (SourceKind, Option<&'a SourceAnalysis>)>,
{
    let survivors: Vec<&SourceAnalysis> = sources
        .into_iter()
        .filter_map(|(_, source)| source)
        .filter(|source| source.is_dangerous)
        .collect();

    if survivors.is_empty() {
        return Verdict::neutral();
    }

    let mut categories: Vec<String> = Vec::new();
    let mut highest_severity = 0u8;

    for source in &survivors {
        highest_severity = highest_severity.max(source.highest_severity);
        for category in &source.dangerous_categories {
            if !categories.iter().any(|c| c == category) {
                categories.push(category.clone());
            }
        }
    }

    let mut per_category = BTreeMap::new();
    for category in &categories {
        let evidence = survivors
            .iter()
            .find_map(|source| source.matches.get(category))
            .cloned()
            .unwrap_or_default();
        per_category.insert(category.clone(), evidence);
    }

    Verdict {
        is_dangerous: true,
        highest_severity,
        categories,
        per_category,
    }
}

/// The fixed source order for a video: title, comments, then transcripts
/// in array order. An empty transcription list contributes nothing, same
/// as an absent one.
pub fn video_sources(video: &VideoRecord) -> Vec<(SourceKind, Option<&SourceAnalysis>)> {
    let mut sources = vec![
        (
            SourceKind::Title,
            video.title_analysis.as_ref().map(|a| &a.results),
        ),
        (
            SourceKind::Comments,
            video.comment_analysis.as_ref().map(|a| &a.results),
        ),
    ];

    for (index, transcript) in video.transcriptions.iter().enumerate() {
        sources.push((
            SourceKind::Transcription(index),
            transcript.analysis.as_ref().map(|a| &a.results),
        ));
    }

    sources
}

/// Aggregate a full video record in the fixed source order
pub fn aggregate_video(video: &VideoRecord) -> Verdict {
    aggregate(video_sources(video))
}

/// Flagged comment examples extracted from the comment-level source
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlaggedExamples {
    /// Up to the first `FLAGGED_EXAMPLE_LIMIT` flagged comments
    pub examples: Vec<FlaggedComment>,

    /// How many flagged comments were left out
    pub omitted: usize,
}

/// Secondary reduction for the "flagged examples" view: the first few
/// entries of the comment source's own flagged list, plus a count of what
/// was omitted.
pub fn flagged_examples(comment_source: Option<&SourceAnalysis>) -> FlaggedExamples {
    let Some(source) = comment_source else {
        return FlaggedExamples::default();
    };
    if !source.is_dangerous || source.dangerous_comments.is_empty() {
        return FlaggedExamples::default();
    }

    let examples: Vec<FlaggedComment> = source
        .dangerous_comments
        .iter()
        .take(FLAGGED_EXAMPLE_LIMIT)
        .cloned()
        .collect();
    let omitted = source.dangerous_comments.len().saturating_sub(FLAGGED_EXAMPLE_LIMIT);

    FlaggedExamples { examples, omitted }
}
