use codecheck_core::{BatchSummary, FileIssueCount, GitContext, InspectionResult, SkippedFile};
use serde::Serialize;

use crate::Result;
use crate::summary::{TOP_FILES_DISPLAY, rank_files, summarize};

/// Structured form of the summary report.
#[derive(Debug, Serialize)]
pub struct SummaryDocument<'a> {
    pub summary: BatchSummary,
    pub top_files: Vec<FileIssueCount>,
    pub results: &'a [InspectionResult],
    #[serde(skip_serializing_if = "<[SkippedFile]>::is_empty")]
    pub skipped: &'a [SkippedFile],
}

impl<'a> SummaryDocument<'a> {
    #[must_use]
    pub fn with_skipped(mut self, skipped: &'a [SkippedFile]) -> Self {
        self.skipped = skipped;
        self
    }
}

#[must_use]
pub fn summary_document<'a>(
    results: &'a [InspectionResult],
    git_context: Option<&GitContext>,
) -> SummaryDocument<'a> {
    let summary = summarize(results, git_context);
    let top_files = rank_files(&summary.per_file_counts, TOP_FILES_DISPLAY)
        .into_iter()
        .cloned()
        .collect();

    SummaryDocument {
        summary,
        top_files,
        results,
        skipped: &[],
    }
}

/// # Errors
///
/// Returns an error if the document cannot be serialized.
pub fn render_summary_json(
    results: &[InspectionResult],
    git_context: Option<&GitContext>,
) -> Result<String> {
    let document = summary_document(results, git_context);
    Ok(serde_json::to_string_pretty(&document)?)
}
