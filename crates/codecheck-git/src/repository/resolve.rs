use std::path::PathBuf;

use codecheck_core::FileSelector;
use git2::{Delta, FileMode};
use indexmap::IndexSet;
use tracing::debug;

use crate::{GitError, Result};

use super::Repository;

impl Repository {
    /// Lists the repository-relative paths changed under `selector`.
    ///
    /// Paths are returned in diff order without duplicates. Deleted entries
    /// and entries that are not regular files are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::RevisionNotFound`] if a commit referenced by the
    /// selector cannot be resolved.
    pub fn resolve_files(&self, selector: &FileSelector) -> Result<Vec<PathBuf>> {
        let mut diff = match selector {
            FileSelector::Staged => {
                let head_tree = self.head_tree()?;
                let mut index = self.inner.index()?;
                index.read(false)?;
                self.inner
                    .diff_tree_to_index(head_tree.as_ref(), Some(&index), None)?
            }
            FileSelector::Unstaged => {
                let mut opts = git2::DiffOptions::new();
                opts.include_untracked(false);
                self.inner.diff_index_to_workdir(None, Some(&mut opts))?
            }
            FileSelector::Commit { commit } => {
                let commit = self.resolve_commit(commit)?;
                let tree = commit.tree()?;

                if commit.parent_count() == 0 {
                    debug!(commit = %commit.id(), "root commit, listing full tree");
                    return tree_files(&tree);
                }

                let parent_tree = commit.parent(0)?.tree()?;
                self.inner
                    .diff_tree_to_tree(Some(&parent_tree), Some(&tree), None)?
            }
            FileSelector::Diff { base, target } => {
                let base_tree = self.resolve_tree(base)?;
                let target = target.as_deref().unwrap_or(FileSelector::DEFAULT_TARGET);
                let target_tree = self.resolve_tree(target)?;
                self.inner
                    .diff_tree_to_tree(Some(&base_tree), Some(&target_tree), None)?
            }
        };

        let mut find_opts = git2::DiffFindOptions::new();
        find_opts.renames(true);
        diff.find_similar(Some(&mut find_opts))?;

        diff_files(&diff)
    }
}

fn is_inspectable(mode: FileMode) -> bool {
    matches!(mode, FileMode::Blob | FileMode::BlobExecutable)
}

fn diff_files(diff: &git2::Diff<'_>) -> Result<Vec<PathBuf>> {
    let mut paths = IndexSet::new();

    for delta in diff.deltas() {
        match delta.status() {
            Delta::Added | Delta::Modified | Delta::Renamed | Delta::Copied | Delta::Typechange => {}
            Delta::Deleted => {
                debug!(path = ?delta.old_file().path(), "skipping deleted file");
                continue;
            }
            status => {
                debug!(path = ?delta.new_file().path(), ?status, "skipping delta");
                continue;
            }
        }

        let path = delta
            .new_file()
            .path()
            .map(PathBuf::from)
            .ok_or(GitError::MissingDeltaPath)?;

        if !is_inspectable(delta.new_file().mode()) {
            debug!(path = %path.display(), "skipping non-file entry");
            continue;
        }

        paths.insert(path);
    }

    Ok(paths.into_iter().collect())
}

fn tree_files(tree: &git2::Tree<'_>) -> Result<Vec<PathBuf>> {
    let blob = i32::from(FileMode::Blob);
    let executable = i32::from(FileMode::BlobExecutable);
    let mut paths = IndexSet::new();

    tree.walk(git2::TreeWalkMode::PreOrder, |dir, entry| {
        let mode = entry.filemode();
        if mode != blob && mode != executable {
            return git2::TreeWalkResult::Ok;
        }
        match entry.name() {
            Some(name) => {
                paths.insert(PathBuf::from(dir).join(name));
            }
            None => debug!(dir, "skipping entry with non UTF-8 name"),
        }
        git2::TreeWalkResult::Ok
    })?;

    Ok(paths.into_iter().collect())
}
