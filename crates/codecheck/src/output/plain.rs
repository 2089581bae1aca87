use std::fmt::Write;

use codecheck_core::{InspectionResult, RuleCatalog, Severity};
use codecheck_operations::executor::BatchProgress;
use codecheck_operations::operations::CheckOutcome;
use codecheck_operations::traits::WrittenReport;
use codecheck_report::{TOP_FILES_DISPLAY, rank_files, summarize};

use super::OutputFormatter;

pub(crate) struct PlainTextFormatter;

impl PlainTextFormatter {
    fn format_counts(output: &mut String, outcome: &CheckOutcome) {
        let summary = summarize(&outcome.results, Some(&outcome.git_context));

        let _ = writeln!(
            output,
            "Inspected {} file(s): {} issue(s), {} failed",
            summary.total_files, summary.total_issues, summary.failed_files
        );

        let counts: Vec<String> = Severity::ALL
            .iter()
            .map(|severity| format!("{severity}: {}", summary.counts_by_severity.get(*severity)))
            .collect();
        let _ = writeln!(output, "  {}", counts.join("  "));

        let ranked = rank_files(&summary.per_file_counts, TOP_FILES_DISPLAY);
        if !ranked.is_empty() {
            output.push_str("\nFiles with most issues:\n");
            for (position, file) in ranked.iter().enumerate() {
                let _ = writeln!(
                    output,
                    "  {}. {} ({})",
                    position + 1,
                    file.path.display(),
                    file.issues
                );
            }
        }
    }

    fn format_failures(output: &mut String, outcome: &CheckOutcome) {
        let mut failed: Vec<_> = outcome.results.iter().filter(|r| r.is_failed()).collect();
        if failed.is_empty() {
            return;
        }
        failed.sort_by(|a, b| a.path.cmp(&b.path));

        output.push_str("\nFailed inspections:\n");
        for result in failed {
            let message = result.error.as_ref().map_or("", |e| e.message.as_str());
            let _ = writeln!(output, "  {}: {message}", result.path.display());
        }
    }
}

impl OutputFormatter for PlainTextFormatter {
    fn format_progress(&self, progress: BatchProgress, result: &InspectionResult) -> String {
        let status = match &result.error {
            Some(error) => format!("failed ({error})"),
            None => format!("{} issue(s)", result.issues.len()),
        };
        format!(
            "[{}/{}] {}: {status}",
            progress.completed,
            progress.total,
            result.path.display()
        )
    }

    fn format_summary(&self, outcome: &CheckOutcome, report: Option<&WrittenReport>) -> String {
        let mut output = String::new();

        if outcome.git_context.files_changed == 0 {
            output.push_str("No files selected\n");
            return output;
        }

        Self::format_counts(&mut output, outcome);
        Self::format_failures(&mut output, outcome);

        if !outcome.skipped.is_empty() {
            let _ = writeln!(output, "\nSkipped {} file(s)", outcome.skipped.len());
        }
        if outcome.cancelled {
            output.push_str("\nRun cancelled before all files were inspected\n");
        }
        if let Some(report) = report {
            let _ = writeln!(output, "\nReport written to {}", report.output_dir.display());
        }

        output
    }

    fn format_rules(&self, catalog: &RuleCatalog) -> String {
        let mut output = String::new();
        for rule in catalog.iter() {
            let _ = writeln!(output, "{}  [{}]  {}", rule.id, rule.severity, rule.title);
        }
        let _ = writeln!(output, "\n{} rule(s)", catalog.len());
        output
    }
}
