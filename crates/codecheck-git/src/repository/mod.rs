mod blob;
mod context;
mod resolve;
mod status;

use std::path::{Path, PathBuf};

use crate::{GitError, Result};

/// Read-only handle used to resolve selectors and read historical content.
pub struct Repository {
    pub(crate) inner: git2::Repository,
    root: PathBuf,
}

impl Repository {
    /// # Errors
    ///
    /// Returns [`GitError::NotARepository`] if the path is not inside a git
    /// repository or the repository has no working directory.
    pub fn open(path: &Path) -> Result<Self> {
        let inner = git2::Repository::discover(path).map_err(|_| GitError::NotARepository {
            path: path.to_path_buf(),
        })?;

        let root = inner.workdir().ok_or_else(|| GitError::NotARepository {
            path: path.to_path_buf(),
        })?;

        // Use dunce to get a path without the \\?\ prefix on Windows
        let root = dunce::simplified(root).to_path_buf();

        Ok(Self { inner, root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full id of the commit `revision` names right now.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::RevisionNotFound`] if the revision does not name
    /// a commit.
    pub fn resolve_revision(&self, revision: &str) -> Result<String> {
        Ok(self.resolve_commit(revision)?.id().to_string())
    }

    fn resolve_commit(&self, revision: &str) -> Result<git2::Commit<'_>> {
        let not_found = || GitError::RevisionNotFound {
            revision: revision.to_string(),
        };

        self.inner
            .revparse_single(revision)
            .map_err(|_| not_found())?
            .peel_to_commit()
            .map_err(|_| not_found())
    }

    fn resolve_tree(&self, revision: &str) -> Result<git2::Tree<'_>> {
        Ok(self.resolve_commit(revision)?.tree()?)
    }

    /// Tree of `HEAD`, or `None` on an unborn branch.
    fn head_tree(&self) -> Result<Option<git2::Tree<'_>>> {
        match self.inner.head() {
            Ok(head) => Ok(Some(head.peel_to_tree()?)),
            Err(err)
                if matches!(
                    err.code(),
                    git2::ErrorCode::UnbornBranch | git2::ErrorCode::NotFound
                ) =>
            {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    pub(crate) fn setup_empty_repo() -> anyhow::Result<(TempDir, Repository)> {
        let dir = TempDir::new()?;
        let repo = git2::Repository::init(dir.path())?;

        let mut config = repo.config()?;
        config.set_str("user.name", "Test")?;
        config.set_str("user.email", "test@example.com")?;

        let repository = Repository::open(dir.path())?;
        Ok((dir, repository))
    }

    pub(crate) fn setup_test_repo() -> anyhow::Result<(TempDir, Repository)> {
        let (dir, repository) = setup_empty_repo()?;
        commit_all(&repository.inner, "Initial commit")?;
        Ok((dir, repository))
    }

    /// Stages every change in the working tree (including deletions) and
    /// commits it on top of `HEAD`.
    pub(crate) fn commit_all(repo: &git2::Repository, message: &str) -> anyhow::Result<git2::Oid> {
        let mut index = repo.index()?;
        index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;
        let sig = git2::Signature::now("Test", "test@example.com")?;
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        Ok(repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?)
    }

    pub(crate) fn stage(repo: &git2::Repository, path: &str) -> anyhow::Result<()> {
        let mut index = repo.index()?;
        index.add_path(Path::new(path))?;
        index.write()?;
        Ok(())
    }

    #[test]
    fn open_repository() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        let expected = dir.path().canonicalize()?;
        let actual = repo.root().canonicalize()?;
        assert_eq!(actual, expected);
        Ok(())
    }

    #[test]
    fn open_from_subdirectory_finds_root() -> anyhow::Result<()> {
        let (dir, _repo) = setup_test_repo()?;
        let nested = dir.path().join("src/deep");
        std::fs::create_dir_all(&nested)?;

        let repo = Repository::open(&nested)?;

        assert_eq!(repo.root().canonicalize()?, dir.path().canonicalize()?);
        Ok(())
    }

    #[test]
    fn open_nonexistent_repository() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let result = Repository::open(dir.path());
        assert!(matches!(result, Err(GitError::NotARepository { .. })));
        Ok(())
    }

    #[test]
    fn resolved_revision_survives_head_moving() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        let pinned = repo.resolve_revision("HEAD")?;

        std::fs::write(dir.path().join("later.py"), "x = 1\n")?;
        let later = commit_all(&repo.inner, "Later")?;

        assert_eq!(pinned.len(), 40);
        assert_ne!(repo.resolve_revision("HEAD")?, pinned);
        assert_eq!(repo.resolve_revision(&later.to_string())?, later.to_string());
        assert!(repo.read_blob(&pinned, Path::new("later.py"))?.is_none());
        assert!(matches!(
            repo.resolve_revision("no-such-branch"),
            Err(GitError::RevisionNotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn head_tree_is_none_on_unborn_branch() -> anyhow::Result<()> {
        let (_dir, repo) = setup_empty_repo()?;
        assert!(repo.head_tree()?.is_none());
        Ok(())
    }
}
