use std::fmt::Write;

use codecheck_core::{
    GitContext, InspectionResult, Issue, RuleCatalog, SelectorKind, Severity, SkippedFile,
};

use crate::summary::{TOP_FILES_DISPLAY, rank_files, summarize};

const GENERIC_HEADER: &str = "# Code Check Report";
const STAGED_HEADER: &str = "# Code Check Report - Git Staged Changes";
const UNSTAGED_HEADER: &str = "# Code Check Report - Git Unstaged Changes";
const COMMIT_HEADER: &str = "# Code Check Report - Git Commit";
const DIFF_HEADER: &str = "# Code Check Report - Git Diff";

#[must_use]
pub fn report_header(git_context: Option<&GitContext>) -> &'static str {
    match git_context.map(|context| context.kind) {
        None => GENERIC_HEADER,
        Some(SelectorKind::Staged) => STAGED_HEADER,
        Some(SelectorKind::Unstaged) => UNSTAGED_HEADER,
        Some(SelectorKind::Commit) => COMMIT_HEADER,
        Some(SelectorKind::Diff) => DIFF_HEADER,
    }
}

#[must_use]
pub fn render_summary_markdown(
    results: &[InspectionResult],
    git_context: Option<&GitContext>,
) -> String {
    let summary = summarize(results, git_context);
    let mut output = String::new();

    output.push_str(report_header(git_context));
    output.push('\n');

    if let Some(context) = git_context {
        format_git_context(&mut output, context);
    }

    output.push_str("\n## Summary\n\n");
    let _ = writeln!(output, "- **Files inspected**: {}", summary.total_files);
    let _ = writeln!(output, "- **Total issues**: {}", summary.total_issues);
    let _ = writeln!(output, "- **Failed inspections**: {}", summary.failed_files);

    output.push_str("\n| Severity | Count |\n|----------|-------|\n");
    for severity in Severity::ALL {
        let _ = writeln!(
            output,
            "| {severity} | {} |",
            summary.counts_by_severity.get(severity)
        );
    }

    let ranked = rank_files(&summary.per_file_counts, TOP_FILES_DISPLAY);
    if !ranked.is_empty() {
        output.push_str("\n## Files With Most Issues\n\n");
        for (position, file) in ranked.iter().enumerate() {
            let _ = writeln!(
                output,
                "{}. `{}` - {} issue(s)",
                position + 1,
                file.path.display(),
                file.issues
            );
        }
    }

    let mut failed: Vec<_> = results.iter().filter(|r| r.is_failed()).collect();
    if !failed.is_empty() {
        failed.sort_by(|a, b| a.path.cmp(&b.path));
        output.push_str("\n## Failed Inspections\n\n");
        for result in failed {
            let message = result.error.as_ref().map_or("", |e| e.message.as_str());
            let _ = writeln!(output, "- `{}`: {message}", result.path.display());
        }
    }

    output
}

/// Section listing files left out of the batch, sorted by path. Empty when
/// nothing was skipped.
#[must_use]
pub fn render_skipped_markdown(skipped: &[SkippedFile]) -> String {
    if skipped.is_empty() {
        return String::new();
    }

    let mut sorted: Vec<&SkippedFile> = skipped.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    let mut output = String::from("\n## Skipped Files\n\n");
    for file in sorted {
        let _ = writeln!(output, "- `{}`: {}", file.path.display(), file.reason);
    }
    output
}

fn format_git_context(output: &mut String, context: &GitContext) {
    output.push_str("\n## Git Context\n\n");

    match context.kind {
        SelectorKind::Staged | SelectorKind::Unstaged => {}
        SelectorKind::Commit => {
            push_field(output, "Commit", context.commit_hash.as_deref());
            push_field(output, "Author", context.author.as_deref());
            push_field(output, "Message", context.commit_message.as_deref());
        }
        SelectorKind::Diff => {
            push_field(output, "Base commit", context.commit1.as_deref());
            push_field(output, "Target commit", context.commit2.as_deref());
        }
    }

    push_field(output, "Branch", context.branch.as_deref());
    let _ = writeln!(output, "- **Files changed**: {}", context.files_changed);
}

fn push_field(output: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value {
        let _ = writeln!(output, "- **{label}**: {value}");
    }
}

/// Renders the report for a single file. Rule titles come from `catalog`;
/// ids it does not know are shown as-is.
#[must_use]
pub fn render_file_markdown(result: &InspectionResult, catalog: &RuleCatalog) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# {}", result.path.display());
    output.push('\n');

    if let Some(error) = &result.error {
        let _ = writeln!(output, "**Status**: inspection failed\n\n```\n{error}\n```");
        return output;
    }

    if result.issues.is_empty() {
        output.push_str("**Status**: no issues found\n");
        return output;
    }

    let _ = writeln!(output, "**Status**: {} issue(s)", result.issues.len());
    output.push_str("\n## Issues\n");

    let mut issues: Vec<&Issue> = result.issues.iter().collect();
    issues.sort_by(|a, b| {
        a.location
            .cmp(&b.location)
            .then_with(|| a.rule.cmp(&b.rule))
    });

    for (position, issue) in issues.into_iter().enumerate() {
        let title = catalog.get(&issue.rule).map(|rule| rule.title.as_str());
        match title {
            Some(title) => {
                let _ = writeln!(output, "\n### {}. [{}] {title}\n", position + 1, issue.rule);
            }
            None => {
                let _ = writeln!(output, "\n### {}. [{}]\n", position + 1, issue.rule);
            }
        }
        let _ = writeln!(output, "- **Severity**: {}", issue.severity);
        let _ = writeln!(output, "- **Location**: {}", issue.location);
        let _ = writeln!(output, "- **Message**: {}", issue.message);
        if let Some(suggestion) = &issue.suggestion {
            let _ = writeln!(output, "- **Suggestion**: {suggestion}");
        }
    }

    output
}
