use std::path::{Path, PathBuf};

use codecheck_core::{FileSelector, GitContext};

use crate::Result;

pub trait GitProvider: Send + Sync {
    /// Working-tree root of the repository containing `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not inside a git repository.
    fn repository_root(&self, path: &Path) -> Result<PathBuf>;

    /// Full commit id that `revision` names at the time of the call.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be opened or the revision
    /// does not name a commit.
    fn resolve_revision(&self, repo_path: &Path, revision: &str) -> Result<String>;

    /// # Errors
    ///
    /// Returns an error if the repository cannot be opened or a revision
    /// named by the selector does not exist.
    fn resolve_files(&self, repo_path: &Path, selector: &FileSelector) -> Result<Vec<PathBuf>>;

    /// Content of `path` at `revision`, or `None` when the revision has no
    /// regular file there.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be opened or the revision
    /// does not exist.
    fn read_blob(&self, repo_path: &Path, revision: &str, path: &Path)
    -> Result<Option<Vec<u8>>>;

    /// # Errors
    ///
    /// Returns an error if commit metadata for the selector cannot be read.
    fn git_context(
        &self,
        repo_path: &Path,
        selector: &FileSelector,
        files_changed: usize,
    ) -> Result<GitContext>;
}
