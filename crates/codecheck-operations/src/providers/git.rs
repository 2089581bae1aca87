use std::path::{Path, PathBuf};

use codecheck_core::{FileSelector, GitContext};
use codecheck_git::Repository;

use crate::Result;
use crate::traits::GitProvider;

pub struct Git2Provider;

impl Git2Provider {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for Git2Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl GitProvider for Git2Provider {
    fn repository_root(&self, path: &Path) -> Result<PathBuf> {
        let repo = Repository::open(path)?;
        Ok(repo.root().to_path_buf())
    }

    fn resolve_revision(&self, repo_path: &Path, revision: &str) -> Result<String> {
        let repo = Repository::open(repo_path)?;
        Ok(repo.resolve_revision(revision)?)
    }

    fn resolve_files(&self, repo_path: &Path, selector: &FileSelector) -> Result<Vec<PathBuf>> {
        let repo = Repository::open(repo_path)?;
        Ok(repo.resolve_files(selector)?)
    }

    fn read_blob(
        &self,
        repo_path: &Path,
        revision: &str,
        path: &Path,
    ) -> Result<Option<Vec<u8>>> {
        let repo = Repository::open(repo_path)?;
        Ok(repo.read_blob(revision, path)?)
    }

    fn git_context(
        &self,
        repo_path: &Path,
        selector: &FileSelector,
        files_changed: usize,
    ) -> Result<GitContext> {
        let repo = Repository::open(repo_path)?;
        Ok(repo.git_context(selector, files_changed)?)
    }
}
