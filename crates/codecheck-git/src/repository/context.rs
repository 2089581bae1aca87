use codecheck_core::{FileSelector, GitContext};

use crate::{CommitInfo, Result};

use super::Repository;

impl Repository {
    /// # Errors
    ///
    /// Returns [`crate::GitError::RevisionNotFound`] if the revision cannot be
    /// resolved to a commit.
    pub fn commit_info(&self, revision: &str) -> Result<CommitInfo> {
        let commit = self.resolve_commit(revision)?;
        let author = commit.author();
        let name = author.name().unwrap_or("unknown");
        let author = match author.email() {
            Some(email) if !email.is_empty() => format!("{name} <{email}>"),
            _ => name.to_string(),
        };

        Ok(CommitInfo {
            sha: commit.id().to_string(),
            summary: commit.summary().unwrap_or_default().to_string(),
            author,
        })
    }

    /// Collects the metadata embedded in a batch report for `selector`.
    ///
    /// # Errors
    ///
    /// Returns an error if a commit named by the selector cannot be resolved.
    pub fn git_context(&self, selector: &FileSelector, files_changed: usize) -> Result<GitContext> {
        let mut context = GitContext::new(selector.kind(), files_changed);
        context.branch = self.branch_name()?;

        match selector {
            FileSelector::Staged | FileSelector::Unstaged => {}
            FileSelector::Commit { commit } => {
                let info = self.commit_info(commit)?;
                context.commit_hash = Some(info.sha);
                context.commit_message = Some(info.summary);
                context.author = Some(info.author);
            }
            FileSelector::Diff { base, target } => {
                let target = target.as_deref().unwrap_or(FileSelector::DEFAULT_TARGET);
                context.commit1 = Some(self.commit_info(base)?.sha);
                context.commit2 = Some(self.commit_info(target)?.sha);
            }
        }

        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{commit_all, setup_test_repo};
    use codecheck_core::{FileSelector, SelectorKind};
    use std::fs;

    #[test]
    fn commit_info_reads_summary_and_author() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        fs::write(dir.path().join("a.py"), "1\n")?;
        let oid = commit_all(&repo.inner, "Add a\n\nLonger body")?;

        let info = repo.commit_info(&oid.to_string())?;

        assert_eq!(info.sha, oid.to_string());
        assert_eq!(info.summary, "Add a");
        assert_eq!(info.author, "Test <test@example.com>");
        Ok(())
    }

    #[test]
    fn commit_context_has_commit_fields() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        fs::write(dir.path().join("a.py"), "1\n")?;
        let oid = commit_all(&repo.inner, "Add a")?;
        let selector = FileSelector::Commit {
            commit: oid.to_string(),
        };

        let context = repo.git_context(&selector, 1)?;

        assert_eq!(context.kind, SelectorKind::Commit);
        assert_eq!(context.commit_hash, Some(oid.to_string()));
        assert_eq!(context.commit_message.as_deref(), Some("Add a"));
        assert!(context.author.is_some());
        assert!(context.commit1.is_none());
        assert_eq!(context.files_changed, 1);
        Ok(())
    }

    #[test]
    fn diff_context_resolves_both_commits() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        let base = repo.inner.head()?.peel_to_commit()?.id();
        fs::write(dir.path().join("a.py"), "1\n")?;
        let head = commit_all(&repo.inner, "Add a")?;
        let selector = FileSelector::Diff {
            base: base.to_string(),
            target: None,
        };

        let context = repo.git_context(&selector, 1)?;

        assert_eq!(context.kind, SelectorKind::Diff);
        assert_eq!(context.commit1, Some(base.to_string()));
        assert_eq!(context.commit2, Some(head.to_string()));
        assert!(context.commit_hash.is_none());
        Ok(())
    }

    #[test]
    fn staged_context_has_branch_only() -> anyhow::Result<()> {
        let (_dir, repo) = setup_test_repo()?;

        let context = repo.git_context(&FileSelector::Staged, 0)?;

        assert_eq!(context.kind, SelectorKind::Staged);
        assert!(context.branch.is_some());
        assert!(context.commit_hash.is_none());
        Ok(())
    }
}
