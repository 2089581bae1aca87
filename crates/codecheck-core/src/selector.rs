use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which Git-tracked files a batch run inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSelector {
    /// Changes recorded in the index relative to `HEAD`.
    Staged,
    /// Tracked files modified in the working tree relative to the index.
    Unstaged,
    /// Files touched by a single commit.
    Commit { commit: String },
    /// Files that differ between `base` and `target` (default `HEAD`).
    Diff {
        base: String,
        target: Option<String>,
    },
}

impl FileSelector {
    pub const DEFAULT_TARGET: &'static str = "HEAD";

    #[must_use]
    pub fn kind(&self) -> SelectorKind {
        match self {
            Self::Staged => SelectorKind::Staged,
            Self::Unstaged => SelectorKind::Unstaged,
            Self::Commit { .. } => SelectorKind::Commit,
            Self::Diff { .. } => SelectorKind::Diff,
        }
    }

    /// True when file content must be read from the object store rather
    /// than the working tree.
    #[must_use]
    pub fn is_historical(&self) -> bool {
        matches!(self, Self::Commit { .. } | Self::Diff { .. })
    }

    /// Revision whose tree holds the content to inspect, for historical
    /// selectors.
    #[must_use]
    pub fn content_revision(&self) -> Option<&str> {
        match self {
            Self::Staged | Self::Unstaged => None,
            Self::Commit { commit } => Some(commit),
            Self::Diff { target, .. } => Some(target.as_deref().unwrap_or(Self::DEFAULT_TARGET)),
        }
    }

    /// Copy of the selector with every revision replaced by `resolve(rev)`.
    /// An implicit diff target is resolved from [`Self::DEFAULT_TARGET`].
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `resolve`.
    pub fn pinned<E>(&self, mut resolve: impl FnMut(&str) -> Result<String, E>) -> Result<Self, E> {
        Ok(match self {
            Self::Staged => Self::Staged,
            Self::Unstaged => Self::Unstaged,
            Self::Commit { commit } => Self::Commit {
                commit: resolve(commit)?,
            },
            Self::Diff { base, target } => Self::Diff {
                base: resolve(base)?,
                target: Some(resolve(
                    target.as_deref().unwrap_or(Self::DEFAULT_TARGET),
                )?),
            },
        })
    }
}

impl fmt::Display for FileSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staged => f.write_str("staged changes"),
            Self::Unstaged => f.write_str("unstaged changes"),
            Self::Commit { commit } => write!(f, "commit {commit}"),
            Self::Diff { base, target } => write!(
                f,
                "diff {base}..{}",
                target.as_deref().unwrap_or(Self::DEFAULT_TARGET)
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    Staged,
    Unstaged,
    Commit,
    Diff,
}

/// A file ready for inspection.
///
/// `disk_path` points either into the working tree or, for historical
/// selectors, into a scratch directory owned by the materializer that
/// created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub original_path: PathBuf,
    pub disk_path: PathBuf,
    pub is_temporary: bool,
}

impl ResolvedFile {
    #[must_use]
    pub fn working_tree(original_path: PathBuf, disk_path: PathBuf) -> Self {
        Self {
            original_path,
            disk_path,
            is_temporary: false,
        }
    }

    #[must_use]
    pub fn temporary(original_path: PathBuf, disk_path: PathBuf) -> Self {
        Self {
            original_path,
            disk_path,
            is_temporary: true,
        }
    }
}

/// Git metadata attached to a batch run and embedded in its report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitContext {
    pub kind: SelectorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit2: Option<String>,
    pub files_changed: usize,
}

impl GitContext {
    #[must_use]
    pub fn new(kind: SelectorKind, files_changed: usize) -> Self {
        Self {
            kind,
            branch: None,
            commit_hash: None,
            commit_message: None,
            author: None,
            commit1: None,
            commit2: None,
            files_changed,
        }
    }
}
