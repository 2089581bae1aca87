//! Temporary on-disk copies of historical file content.
//!
//! Commit and diff selectors inspect content straight from the object
//! store. A [`TempFileMaterializer`] writes that content into a private
//! scratch directory, mirroring repository-relative paths so that names
//! and extensions survive, and removes the directory when the run ends.

use std::fs;
use std::path::{Component, Path, PathBuf};

pub use codecheck_core::{SkipReason, SkippedFile};

use codecheck_core::{MAX_INSPECTED_BYTES, ResolvedFile};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::{CleanupFailure, OperationError, Result};

const SCRATCH_PREFIX: &str = "codecheck-";

/// Returns the reason `content` must not be inspected, if any.
#[must_use]
pub fn screen_content(content: &[u8]) -> Option<SkipReason> {
    let size = content.len() as u64;
    if size > MAX_INSPECTED_BYTES {
        return Some(SkipReason::TooLarge { size });
    }
    if content.contains(&0) {
        return Some(SkipReason::Binary);
    }
    None
}

/// True when `path` is relative and made only of normal components.
pub(crate) fn is_plain_relative(path: &Path) -> bool {
    path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

#[derive(Debug)]
pub enum Materialized<'a> {
    Written(&'a ResolvedFile),
    Skipped(SkipReason),
}

/// Owns a scratch directory and every file written into it.
///
/// [`close`](Self::close) removes the directory and reports failures.
/// Dropping the materializer without closing it also removes the
/// directory, silently.
pub struct TempFileMaterializer {
    scratch: TempDir,
    files: Vec<ResolvedFile>,
}

impl TempFileMaterializer {
    /// # Errors
    ///
    /// Returns [`OperationError::ScratchDir`] if the scratch directory cannot
    /// be created.
    pub fn new() -> Result<Self> {
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir()
            .map_err(OperationError::ScratchDir)?;
        debug!(dir = %scratch.path().display(), "created scratch directory");

        Ok(Self {
            scratch,
            files: Vec::new(),
        })
    }

    #[must_use]
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Files written so far, in materialization order.
    #[must_use]
    pub fn files(&self) -> &[ResolvedFile] {
        &self.files
    }

    /// Repository-relative path of a file this materializer wrote.
    #[must_use]
    pub fn original_path(&self, disk_path: &Path) -> Option<&Path> {
        self.files
            .iter()
            .find(|file| file.disk_path == disk_path)
            .map(|file| file.original_path.as_path())
    }

    /// Screens `content` and, if it is inspectable, writes it to the
    /// scratch directory at `original_path`.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::UnsafePath`] if `original_path` is not a
    /// plain relative path, or [`OperationError::Materialize`] if writing
    /// fails.
    pub fn materialize(&mut self, original_path: &Path, content: &[u8]) -> Result<Materialized<'_>> {
        if !is_plain_relative(original_path) {
            return Err(OperationError::UnsafePath {
                path: original_path.to_path_buf(),
            });
        }

        if let Some(reason) = screen_content(content) {
            return Ok(Materialized::Skipped(reason));
        }

        let disk_path = self.scratch.path().join(original_path);
        let to_error = |source| OperationError::Materialize {
            path: original_path.to_path_buf(),
            source,
        };

        if let Some(parent) = disk_path.parent() {
            fs::create_dir_all(parent).map_err(to_error)?;
        }
        fs::write(&disk_path, content).map_err(to_error)?;

        let index = self.files.len();
        self.files
            .push(ResolvedFile::temporary(original_path.to_path_buf(), disk_path));
        Ok(Materialized::Written(&self.files[index]))
    }

    /// Removes the scratch directory and everything in it.
    ///
    /// # Errors
    ///
    /// Returns a [`CleanupFailure`] naming the directory if it could not be
    /// removed completely.
    pub fn close(self) -> std::result::Result<(), CleanupFailure> {
        let path = self.scratch.path().to_path_buf();
        match self.scratch.close() {
            Ok(()) => {
                debug!(dir = %path.display(), "removed scratch directory");
                Ok(())
            }
            Err(source) => {
                warn!(dir = %path.display(), error = %source, "failed to remove scratch directory");
                Err(CleanupFailure { path, source })
            }
        }
    }
}

/// Screens a working-tree file without reading more than necessary.
///
/// # Errors
///
/// Returns [`OperationError::FileRead`] if the file exists but cannot be
/// read.
pub fn screen_working_tree_file(path: &Path) -> Result<Option<SkipReason>> {
    let to_error = |source| OperationError::FileRead {
        path: path.to_path_buf(),
        source,
    };

    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Some(SkipReason::Missing));
        }
        Err(err) => return Err(to_error(err)),
    };

    if !metadata.is_file() {
        return Ok(Some(SkipReason::Missing));
    }
    if metadata.len() > MAX_INSPECTED_BYTES {
        return Ok(Some(SkipReason::TooLarge {
            size: metadata.len(),
        }));
    }

    let content = fs::read(path).map_err(to_error)?;
    Ok(screen_content(&content))
}
