use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use codecheck_core::{CheckerOptions, FileSelector, GitContext, InspectionResult, ResolvedFile, RuleCatalog};
use codecheck_report::build_artifacts;
use tracing::{debug, info, warn};

use crate::executor::{BatchExecutor, BatchProgress};
use crate::materialize::{
    Materialized, SkipReason, SkippedFile, TempFileMaterializer, screen_working_tree_file,
};
use crate::traits::{GitProvider, Inspector, ReportWriter, WrittenReport};
use crate::{CleanupFailure, Result};

pub struct CheckInput {
    pub selector: FileSelector,
    pub options: CheckerOptions,
}

#[derive(Debug)]
pub struct CheckOutcome {
    pub repository_root: PathBuf,
    /// One entry per inspected file, in completion order.
    pub results: Vec<InspectionResult>,
    /// Resolved files left out before inspection.
    pub skipped: Vec<SkippedFile>,
    pub git_context: GitContext,
    pub cancelled: bool,
    /// Set when the scratch directory of a historical run outlived it.
    pub cleanup_failure: Option<CleanupFailure>,
}

pub struct CheckOperation<G, I> {
    git_provider: G,
    inspector: I,
    catalog: RuleCatalog,
}

impl<G, I> CheckOperation<G, I>
where
    G: GitProvider,
    I: Inspector,
{
    pub fn new(git_provider: G, inspector: I, catalog: RuleCatalog) -> Self {
        Self {
            git_provider,
            inspector,
            catalog,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn inspector(&self) -> &I {
        &self.inspector
    }

    /// Resolves, prepares and inspects the files named by `input.selector`.
    ///
    /// `on_result` sees every result as it completes and may stop the run.
    /// Scratch files created for historical selectors are removed before
    /// this returns, whether the run completed, was cancelled or failed.
    ///
    /// # Errors
    ///
    /// Returns an error if resolution, materialization, or worker pool
    /// startup fails. Individual inspection failures are reported in the
    /// outcome instead.
    pub fn execute<F>(
        &self,
        start_path: &Path,
        input: &CheckInput,
        on_result: F,
    ) -> Result<CheckOutcome>
    where
        F: FnMut(BatchProgress, &InspectionResult) -> ControlFlow<()>,
    {
        let root = self.git_provider.repository_root(start_path)?;
        // Every later read uses commit ids, so a moving branch cannot mix
        // content from two commits into one run.
        let selector = input
            .selector
            .pinned(|revision| self.git_provider.resolve_revision(&root, revision))?;
        let paths = self.git_provider.resolve_files(&root, &selector)?;
        let git_context = self
            .git_provider
            .git_context(&root, &selector, paths.len())?;

        info!(selector = %input.selector, files = paths.len(), "resolved files");
        debug!(%selector, "pinned selector");

        let executor = BatchExecutor::new(&self.inspector, &self.catalog, input.options);

        let (run, skipped, cleanup_failure) = match selector.content_revision() {
            Some(revision) => {
                let (materializer, skipped) = self.materialize(&root, revision, &paths)?;
                let run = executor.run(materializer.files(), on_result);
                let cleanup_failure = materializer.close().err();
                (run?, skipped, cleanup_failure)
            }
            None => {
                let (files, skipped) = screen_working_tree(&root, &paths)?;
                (executor.run(&files, on_result)?, skipped, None)
            }
        };

        Ok(CheckOutcome {
            repository_root: root,
            results: run.results,
            skipped,
            git_context,
            cancelled: run.cancelled,
            cleanup_failure,
        })
    }

    /// Renders the outcome's reports and hands them to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    pub fn write_report<W: ReportWriter>(
        &self,
        outcome: &CheckOutcome,
        writer: &W,
    ) -> Result<WrittenReport> {
        let artifacts = build_artifacts(
            &outcome.results,
            &outcome.skipped,
            Some(&outcome.git_context),
            &self.catalog,
        )?;
        writer.write(&artifacts)
    }

    fn materialize(
        &self,
        root: &Path,
        revision: &str,
        paths: &[PathBuf],
    ) -> Result<(TempFileMaterializer, Vec<SkippedFile>)> {
        let mut materializer = TempFileMaterializer::new()?;
        let mut skipped = Vec::new();

        for path in paths {
            let reason = match self.git_provider.read_blob(root, revision, path)? {
                None => Some(SkipReason::Missing),
                Some(content) => match materializer.materialize(path, &content)? {
                    Materialized::Written(_) => None,
                    Materialized::Skipped(reason) => Some(reason),
                },
            };

            if let Some(reason) = reason {
                record_skip(&mut skipped, path, reason);
            }
        }

        Ok((materializer, skipped))
    }
}

fn screen_working_tree(
    root: &Path,
    paths: &[PathBuf],
) -> Result<(Vec<ResolvedFile>, Vec<SkippedFile>)> {
    let mut files = Vec::with_capacity(paths.len());
    let mut skipped = Vec::new();

    for path in paths {
        let disk_path = root.join(path);
        match screen_working_tree_file(&disk_path)? {
            Some(reason) => record_skip(&mut skipped, path, reason),
            None => files.push(ResolvedFile::working_tree(path.clone(), disk_path)),
        }
    }

    Ok((files, skipped))
}

fn record_skip(skipped: &mut Vec<SkippedFile>, path: &Path, reason: SkipReason) {
    if reason == SkipReason::Missing {
        warn!(path = %path.display(), %reason, "skipping file");
    } else {
        info!(path = %path.display(), %reason, "skipping file");
    }
    skipped.push(SkippedFile {
        path: path.to_path_buf(),
        reason,
    });
}
