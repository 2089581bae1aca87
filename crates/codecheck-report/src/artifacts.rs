use std::path::PathBuf;

use codecheck_core::{GitContext, InspectionResult, RuleCatalog, SkippedFile};

use crate::json::summary_document;
use crate::markdown::{render_file_markdown, render_skipped_markdown, render_summary_markdown};
use crate::Result;

/// Collection a per-file report is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    WithIssues,
    NoIssues,
}

impl Partition {
    pub const ALL: [Self; 2] = [Self::WithIssues, Self::NoIssues];

    #[must_use]
    pub fn of(result: &InspectionResult) -> Self {
        if result.needs_attention() {
            Self::WithIssues
        } else {
            Self::NoIssues
        }
    }

    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::WithIssues => "with_issues",
            Self::NoIssues => "no_issues",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub partition: Partition,
    pub markdown: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifacts {
    pub summary_markdown: String,
    pub summary_json: String,
    pub files: Vec<FileReport>,
}

/// Splits results into files needing attention (issues or a failed
/// inspection) and clean files, each sorted by path.
#[must_use]
pub fn partition(
    results: &[InspectionResult],
) -> (Vec<&InspectionResult>, Vec<&InspectionResult>) {
    let (mut with_issues, mut no_issues): (Vec<_>, Vec<_>) = results
        .iter()
        .partition(|result| Partition::of(result) == Partition::WithIssues);

    with_issues.sort_by(|a, b| a.path.cmp(&b.path));
    no_issues.sort_by(|a, b| a.path.cmp(&b.path));

    (with_issues, no_issues)
}

/// Renders every artifact of a batch run. Both summaries list `skipped`.
///
/// # Errors
///
/// Returns an error if the JSON summary cannot be serialized.
pub fn build_artifacts(
    results: &[InspectionResult],
    skipped: &[SkippedFile],
    git_context: Option<&GitContext>,
    catalog: &RuleCatalog,
) -> Result<ReportArtifacts> {
    let (with_issues, no_issues) = partition(results);

    let files = with_issues
        .into_iter()
        .chain(no_issues)
        .map(|result| FileReport {
            path: result.path.clone(),
            partition: Partition::of(result),
            markdown: render_file_markdown(result, catalog),
        })
        .collect();

    let mut summary_markdown = render_summary_markdown(results, git_context);
    summary_markdown.push_str(&render_skipped_markdown(skipped));

    let document = summary_document(results, git_context).with_skipped(skipped);

    Ok(ReportArtifacts {
        summary_markdown,
        summary_json: serde_json::to_string_pretty(&document)?,
        files,
    })
}
