mod git_provider;
mod inspector;
mod report_writer;

pub use git_provider::GitProvider;
pub use inspector::{InspectionRequest, Inspector};
pub use report_writer::{ReportWriter, WrittenReport};
