use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use codecheck_core::{FileSelector, GitContext, InspectionError, Issue};
use codecheck_git::GitError;

use crate::Result;
use crate::traits::{GitProvider, InspectionRequest, Inspector};

pub struct MockGitProvider {
    root: PathBuf,
    files: Vec<PathBuf>,
    blobs: HashMap<PathBuf, Vec<u8>>,
    missing_revision: Option<String>,
    commit_ids: HashMap<String, String>,
    revisions_read: Mutex<Vec<String>>,
}

impl MockGitProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/mock/repo"),
            files: Vec::new(),
            blobs: HashMap::new(),
            missing_revision: None,
            commit_ids: HashMap::new(),
            revisions_read: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_root(mut self, root: &Path) -> Self {
        self.root = root.to_path_buf();
        self
    }

    /// Adds a resolved path with no content in the object store.
    #[must_use]
    pub fn with_file(mut self, path: &str) -> Self {
        self.files.push(PathBuf::from(path));
        self
    }

    #[must_use]
    pub fn with_blob(mut self, path: &str, content: &[u8]) -> Self {
        self.files.push(PathBuf::from(path));
        self.blobs.insert(PathBuf::from(path), content.to_vec());
        self
    }

    #[must_use]
    pub fn with_missing_revision(mut self, revision: &str) -> Self {
        self.missing_revision = Some(revision.to_string());
        self
    }

    /// Makes `revision` resolve to `id`. Unmapped revisions resolve to
    /// themselves.
    #[must_use]
    pub fn with_commit_id(mut self, revision: &str, id: &str) -> Self {
        self.commit_ids.insert(revision.to_string(), id.to_string());
        self
    }

    pub fn revisions_read(&self) -> Vec<String> {
        self.revisions_read
            .lock()
            .map(|revisions| revisions.clone())
            .unwrap_or_default()
    }

    fn check_revision(&self, revision: &str) -> Result<()> {
        if self.missing_revision.as_deref() == Some(revision) {
            return Err(GitError::RevisionNotFound {
                revision: revision.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl Default for MockGitProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GitProvider for MockGitProvider {
    fn repository_root(&self, _path: &Path) -> Result<PathBuf> {
        Ok(self.root.clone())
    }

    fn resolve_revision(&self, _repo_path: &Path, revision: &str) -> Result<String> {
        self.check_revision(revision)?;
        Ok(self
            .commit_ids
            .get(revision)
            .cloned()
            .unwrap_or_else(|| revision.to_string()))
    }

    fn resolve_files(&self, _repo_path: &Path, selector: &FileSelector) -> Result<Vec<PathBuf>> {
        match selector {
            FileSelector::Commit { commit } => self.check_revision(commit)?,
            FileSelector::Diff { base, target } => {
                self.check_revision(base)?;
                if let Some(target) = target {
                    self.check_revision(target)?;
                }
            }
            FileSelector::Staged | FileSelector::Unstaged => {}
        }
        Ok(self.files.clone())
    }

    fn read_blob(
        &self,
        _repo_path: &Path,
        revision: &str,
        path: &Path,
    ) -> Result<Option<Vec<u8>>> {
        self.check_revision(revision)?;
        if let Ok(mut revisions) = self.revisions_read.lock() {
            if !revisions.iter().any(|r| r == revision) {
                revisions.push(revision.to_string());
            }
        }
        Ok(self.blobs.get(path).cloned())
    }

    fn git_context(
        &self,
        _repo_path: &Path,
        selector: &FileSelector,
        files_changed: usize,
    ) -> Result<GitContext> {
        let mut context = GitContext::new(selector.kind(), files_changed);
        context.branch = Some("main".to_string());
        Ok(context)
    }
}

/// Inspector that records what it was asked to inspect.
///
/// Files whose path contains `fail` produce an inspection error; everything
/// else comes back clean.
pub struct MockInspector {
    seen: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl MockInspector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
        }
    }

    /// `(original_path, disk_path)` pairs in call order.
    pub fn seen(&self) -> Vec<(PathBuf, PathBuf)> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

impl Default for MockInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector for MockInspector {
    fn inspect(
        &self,
        request: &InspectionRequest<'_>,
    ) -> std::result::Result<Vec<Issue>, InspectionError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((
                request.original_path.to_path_buf(),
                request.disk_path.to_path_buf(),
            ));
        }
        if request.original_path.to_string_lossy().contains("fail") {
            return Err(InspectionError::new("mock inspection failure"));
        }
        Ok(Vec::new())
    }
}
