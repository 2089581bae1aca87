use std::path::PathBuf;

use thiserror::Error;

/// Scratch directory that could not be removed after a batch run.
///
/// Reported alongside the run's results instead of replacing them.
#[derive(Debug, Error)]
#[error("failed to remove scratch directory '{path}'")]
pub struct CleanupFailure {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Git(#[from] codecheck_git::GitError),

    #[error(transparent)]
    Catalog(#[from] codecheck_core::CatalogError),

    #[error(transparent)]
    Report(#[from] codecheck_report::ReportError),

    #[error("failed to start worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to create scratch directory")]
    ScratchDir(#[source] std::io::Error),

    #[error("failed to materialize '{path}'")]
    Materialize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read '{path}'")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path escapes its target directory: '{path}'")]
    UnsafePath { path: PathBuf },

    #[error("failed to write report file '{path}'")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("inspector command is empty")]
    EmptyInspectorCommand,
}

pub type Result<T> = std::result::Result<T, OperationError>;
