//! Report rendering for batch inspection runs.
//!
//! Every function here is pure: results and optional Git context go in,
//! Markdown text and JSON come out. Persisting the output is left to the
//! caller.

mod artifacts;
mod error;
mod json;
mod markdown;
mod summary;

pub use artifacts::{FileReport, Partition, ReportArtifacts, build_artifacts, partition};
pub use error::ReportError;
pub use json::{SummaryDocument, render_summary_json, summary_document};
pub use markdown::{
    render_file_markdown, render_skipped_markdown, render_summary_markdown, report_header,
};
pub use summary::{TOP_FILES_DISPLAY, rank_files, summarize};

pub type Result<T> = std::result::Result<T, ReportError>;
