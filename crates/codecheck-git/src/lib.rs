mod error;
mod repository;
mod types;

pub use error::GitError;
pub use repository::Repository;
pub use types::CommitInfo;

use std::path::{Path, PathBuf};

use codecheck_core::FileSelector;

pub type Result<T> = std::result::Result<T, GitError>;

/// # Errors
///
/// Returns an error if the path is not inside a git repository or if the
/// selector cannot be resolved.
pub fn resolve_files(path: &Path, selector: &FileSelector) -> Result<Vec<PathBuf>> {
    Repository::open(path)?.resolve_files(selector)
}
