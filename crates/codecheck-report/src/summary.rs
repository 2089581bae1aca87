use codecheck_core::{BatchSummary, FileIssueCount, GitContext, InspectionResult, SeverityCounts};

/// Number of entries shown in the "files with most issues" ranking.
pub const TOP_FILES_DISPLAY: usize = 5;

#[must_use]
pub fn summarize(results: &[InspectionResult], git_context: Option<&GitContext>) -> BatchSummary {
    let mut counts_by_severity = SeverityCounts::default();
    let mut per_file_counts = Vec::with_capacity(results.len());
    let mut failed_files = 0;

    for result in results {
        if result.is_failed() {
            failed_files += 1;
        }
        for issue in &result.issues {
            counts_by_severity.record(issue.severity);
        }
        per_file_counts.push(FileIssueCount {
            path: result.path.clone(),
            issues: result.issues.len(),
        });
    }

    per_file_counts.sort_by(|a, b| a.path.cmp(&b.path));

    BatchSummary {
        total_files: results.len(),
        total_issues: per_file_counts.iter().map(|f| f.issues).sum(),
        failed_files,
        counts_by_severity,
        per_file_counts,
        git_context: git_context.cloned(),
    }
}

/// Files with at least one issue, most issues first, ties broken by path.
#[must_use]
pub fn rank_files(counts: &[FileIssueCount], limit: usize) -> Vec<&FileIssueCount> {
    let mut ranked: Vec<_> = counts.iter().filter(|f| f.issues > 0).collect();
    ranked.sort_by(|a, b| b.issues.cmp(&a.issues).then_with(|| a.path.cmp(&b.path)));
    ranked.truncate(limit);
    ranked
}
