use std::path::Path;

use codecheck_core::{InspectionError, Issue, RuleCatalog};

/// Everything an inspector gets to look at for one file.
#[derive(Debug, Clone, Copy)]
pub struct InspectionRequest<'a> {
    /// Repository-relative path, as reported in results.
    pub original_path: &'a Path,
    /// Where the content can be read on disk.
    pub disk_path: &'a Path,
    pub content: &'a str,
    pub catalog: &'a RuleCatalog,
}

/// The engine that applies the rule catalog to a file.
///
/// Implementations are called concurrently from worker threads. A returned
/// error fails only the file being inspected.
pub trait Inspector: Send + Sync {
    /// # Errors
    ///
    /// Returns an [`InspectionError`] when the file could not be inspected.
    fn inspect(&self, request: &InspectionRequest<'_>) -> Result<Vec<Issue>, InspectionError>;
}

impl<F> Inspector for F
where
    F: Fn(&InspectionRequest<'_>) -> Result<Vec<Issue>, InspectionError> + Send + Sync,
{
    fn inspect(&self, request: &InspectionRequest<'_>) -> Result<Vec<Issue>, InspectionError> {
        self(request)
    }
}
