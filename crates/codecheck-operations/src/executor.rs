//! Concurrent inspection of a resolved file set.
//!
//! A [`BatchExecutor`] owns a bounded worker pool for the duration of one
//! run. Each file is inspected on a worker; results flow back over a
//! channel to the calling thread, which reports progress in completion
//! order. A failing or panicking inspection produces a failed result for
//! that file and never takes down the batch.

use std::any::Any;
use std::collections::HashSet;
use std::fs;
use std::ops::ControlFlow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use codecheck_core::{
    CheckerOptions, InspectionError, InspectionResult, Issue, LineRange, ResolvedFile, RuleCatalog,
};
use indexmap::IndexMap;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info, warn};

use crate::Result;
use crate::traits::{InspectionRequest, Inspector};

/// Tolerates rounding in `threshold * runs`.
const CONSENSUS_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Default)]
pub struct BatchRun {
    /// Results in completion order.
    pub results: Vec<InspectionResult>,
    /// True when the progress callback stopped the run early.
    pub cancelled: bool,
}

pub struct BatchExecutor<'a, I> {
    inspector: &'a I,
    catalog: &'a RuleCatalog,
    options: CheckerOptions,
}

impl<'a, I: Inspector> BatchExecutor<'a, I> {
    #[must_use]
    pub fn new(inspector: &'a I, catalog: &'a RuleCatalog, options: CheckerOptions) -> Self {
        Self {
            inspector,
            catalog,
            options,
        }
    }

    /// Inspects every file with at most `options.workers()` running at once.
    ///
    /// `on_result` is called on the calling thread once per completed file.
    /// Returning [`ControlFlow::Break`] stops files that have not started;
    /// files already in flight finish but their results are discarded.
    /// Without cancellation the run yields exactly one result per file.
    ///
    /// # Errors
    ///
    /// Returns an error only if the worker pool cannot be started.
    pub fn run<F>(&self, files: &[ResolvedFile], mut on_result: F) -> Result<BatchRun>
    where
        F: FnMut(BatchProgress, &InspectionResult) -> ControlFlow<()>,
    {
        let total = files.len();
        if total == 0 {
            return Ok(BatchRun::default());
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.options.workers())
            .thread_name(|index| format!("codecheck-worker-{index}"))
            .build()?;

        info!(
            files = total,
            workers = self.options.workers(),
            repeat = self.options.repeat(),
            "starting batch"
        );

        let stop = AtomicBool::new(false);
        let (sender, receiver) = mpsc::channel();

        let run = pool.in_place_scope(|scope| {
            for file in files {
                let sender = sender.clone();
                let stop = &stop;
                scope.spawn(move |_| {
                    if stop.load(Ordering::Acquire) {
                        debug!(path = %file.original_path.display(), "not started, batch cancelled");
                        return;
                    }
                    let _ = sender.send(self.inspect_file(file));
                });
            }
            drop(sender);

            let mut run = BatchRun::default();
            for result in receiver {
                if run.cancelled {
                    continue;
                }
                let progress = BatchProgress {
                    completed: run.results.len() + 1,
                    total,
                };
                let flow = on_result(progress, &result);
                run.results.push(result);
                if flow.is_break() {
                    stop.store(true, Ordering::Release);
                    run.cancelled = true;
                }
            }
            run
        });

        if run.cancelled {
            info!(completed = run.results.len(), total, "batch cancelled");
        }

        Ok(run)
    }

    fn inspect_file(&self, file: &ResolvedFile) -> InspectionResult {
        let path = file.original_path.clone();
        debug!(path = %path.display(), "inspecting");

        let bytes = match fs::read(&file.disk_path) {
            Ok(bytes) => bytes,
            Err(err) => {
                return InspectionResult::failed(
                    path,
                    InspectionError::new(format!("failed to read file: {err}")),
                );
            }
        };
        let Ok(content) = String::from_utf8(bytes) else {
            return InspectionResult::failed(path, InspectionError::new("file is not valid UTF-8"));
        };

        let request = InspectionRequest {
            original_path: &file.original_path,
            disk_path: &file.disk_path,
            content: &content,
            catalog: self.catalog,
        };

        let mut runs = Vec::new();
        let mut last_error = None;

        for attempt in 1..=self.options.repeat() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.inspector.inspect(&request)));
            let error = match outcome {
                Ok(Ok(issues)) => {
                    runs.push(issues);
                    continue;
                }
                Ok(Err(err)) => err,
                Err(payload) => InspectionError::new(format!(
                    "inspector panicked: {}",
                    panic_message(payload.as_ref())
                )),
            };
            warn!(path = %path.display(), attempt, error = %error, "inspection failed");
            last_error = Some(error);
        }

        if runs.is_empty() {
            let error =
                last_error.unwrap_or_else(|| InspectionError::new("inspection did not run"));
            return InspectionResult::failed(path, error);
        }

        InspectionResult::inspected(path, apply_consensus(runs, self.options.consensus()))
    }
}

/// Merges repeated inspections of one file.
///
/// Issues are identified by rule and location. An issue is kept when it
/// appears in at least `threshold` of the runs, in order of first
/// appearance. A single run is returned unchanged.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn apply_consensus(runs: Vec<Vec<Issue>>, threshold: f64) -> Vec<Issue> {
    let total = runs.len();
    if total <= 1 {
        return runs.into_iter().next().unwrap_or_default();
    }

    let mut tally: IndexMap<(String, LineRange), (Issue, usize)> = IndexMap::new();
    for run in runs {
        let mut seen = HashSet::new();
        for issue in run {
            let key = (issue.rule.clone(), issue.location);
            if !seen.insert(key.clone()) {
                continue;
            }
            tally.entry(key).or_insert((issue, 0)).1 += 1;
        }
    }

    let required = threshold * total as f64 - CONSENSUS_EPSILON;
    tally
        .into_values()
        .filter(|(_, count)| *count as f64 >= required)
        .map(|(issue, _)| issue)
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
