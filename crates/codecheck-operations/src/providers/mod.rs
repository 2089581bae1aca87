mod command;
mod git;
mod report;

pub use command::{CommandInspector, DEFAULT_INSPECTOR_TIMEOUT};
pub use git::Git2Provider;
pub use report::FileSystemReportWriter;
