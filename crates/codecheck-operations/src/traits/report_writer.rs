use std::path::PathBuf;

use codecheck_report::ReportArtifacts;

use crate::Result;

/// Locations of the files produced by a [`ReportWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenReport {
    pub output_dir: PathBuf,
    pub summary_markdown: PathBuf,
    pub summary_json: PathBuf,
    pub file_reports: usize,
}

pub trait ReportWriter {
    /// # Errors
    ///
    /// Returns an error if any report file cannot be written.
    fn write(&self, artifacts: &ReportArtifacts) -> Result<WrittenReport>;
}
