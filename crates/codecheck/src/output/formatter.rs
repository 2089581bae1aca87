use codecheck_core::{InspectionResult, RuleCatalog};
use codecheck_operations::executor::BatchProgress;
use codecheck_operations::operations::CheckOutcome;
use codecheck_operations::traits::WrittenReport;

pub(crate) trait OutputFormatter {
    fn format_progress(&self, progress: BatchProgress, result: &InspectionResult) -> String;
    fn format_summary(&self, outcome: &CheckOutcome, report: Option<&WrittenReport>) -> String;
    fn format_rules(&self, catalog: &RuleCatalog) -> String;
}
