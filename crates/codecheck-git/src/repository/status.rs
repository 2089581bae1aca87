use crate::{GitError, Result};

use super::Repository;

impl Repository {
    /// # Errors
    ///
    /// Returns [`GitError::DetachedHead`] if HEAD is not on a branch.
    pub fn current_branch(&self) -> Result<String> {
        let head = self.inner.head()?;

        if !head.is_branch() {
            return Err(GitError::DetachedHead);
        }

        head.shorthand()
            .map(String::from)
            .ok_or(GitError::DetachedHead)
    }

    /// Branch name for report context; `None` when HEAD is detached or unborn.
    ///
    /// # Errors
    ///
    /// Returns an error for failures other than a detached or unborn HEAD.
    pub fn branch_name(&self) -> Result<Option<String>> {
        match self.current_branch() {
            Ok(branch) => Ok(Some(branch)),
            Err(GitError::DetachedHead) => Ok(None),
            Err(GitError::Git(err))
                if matches!(
                    err.code(),
                    git2::ErrorCode::UnbornBranch | git2::ErrorCode::NotFound
                ) =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
