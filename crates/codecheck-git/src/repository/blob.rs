use std::path::Path;

use crate::Result;

use super::Repository;

impl Repository {
    /// Reads the content of `path` as stored in the tree of `revision`.
    ///
    /// Returns `None` when the path does not name a file in that tree.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GitError::RevisionNotFound`] if the revision cannot be
    /// resolved, or a git error if the object store cannot be read.
    pub fn read_blob(&self, revision: &str, path: &Path) -> Result<Option<Vec<u8>>> {
        let tree = self.resolve_tree(revision)?;

        let entry = match tree.get_path(path) {
            Ok(entry) => entry,
            Err(err) if err.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let object = entry.to_object(&self.inner)?;
        Ok(object.as_blob().map(|blob| blob.content().to_vec()))
    }
}
