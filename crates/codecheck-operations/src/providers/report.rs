use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use codecheck_report::{Partition, ReportArtifacts};
use tracing::debug;

use crate::materialize::is_plain_relative;
use crate::traits::{ReportWriter, WrittenReport};
use crate::{OperationError, Result};

pub const SUMMARY_MARKDOWN_FILE: &str = "summary.md";
pub const SUMMARY_JSON_FILE: &str = "summary.json";

/// Writes report artifacts below a single output directory:
///
/// ```text
/// <output-dir>/summary.md
/// <output-dir>/summary.json
/// <output-dir>/with_issues/<path>.md
/// <output-dir>/no_issues/<path>.md
/// ```
///
/// Both partition directories are emptied first, so a rerun into the same
/// directory leaves exactly one report per inspected file.
pub struct FileSystemReportWriter {
    output_dir: PathBuf,
}

impl FileSystemReportWriter {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn file_report_path(&self, partition_dir: &str, path: &Path) -> Result<PathBuf> {
        if !is_plain_relative(path) {
            return Err(OperationError::UnsafePath {
                path: path.to_path_buf(),
            });
        }

        let mut file_name = OsString::from(path.as_os_str());
        file_name.push(".md");
        Ok(self.output_dir.join(partition_dir).join(file_name))
    }

    fn clear_partitions(&self) -> Result<()> {
        for partition in Partition::ALL {
            let dir = self.output_dir.join(partition.dir_name());
            match fs::remove_dir_all(&dir) {
                Ok(()) => debug!(dir = %dir.display(), "removed previous file reports"),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(OperationError::ReportWrite { path: dir, source }),
            }
        }
        Ok(())
    }
}

impl ReportWriter for FileSystemReportWriter {
    fn write(&self, artifacts: &ReportArtifacts) -> Result<WrittenReport> {
        for report in &artifacts.files {
            if !is_plain_relative(&report.path) {
                return Err(OperationError::UnsafePath {
                    path: report.path.clone(),
                });
            }
        }
        self.clear_partitions()?;

        let summary_markdown = self.output_dir.join(SUMMARY_MARKDOWN_FILE);
        let summary_json = self.output_dir.join(SUMMARY_JSON_FILE);

        write_file(&summary_markdown, &artifacts.summary_markdown)?;
        write_file(&summary_json, &artifacts.summary_json)?;

        for report in &artifacts.files {
            let target = self.file_report_path(report.partition.dir_name(), &report.path)?;
            write_file(&target, &report.markdown)?;
        }

        debug!(
            dir = %self.output_dir.display(),
            files = artifacts.files.len(),
            "wrote report"
        );

        Ok(WrittenReport {
            output_dir: self.output_dir.clone(),
            summary_markdown,
            summary_json,
            file_reports: artifacts.files.len(),
        })
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    let to_error = |source| OperationError::ReportWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    fs::write(path, content).map_err(to_error)
}
