use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use codecheck_core::{FileSelector, InspectionResult, OptionKey, Severity};
use codecheck_operations::executor::BatchProgress;
use codecheck_operations::operations::{CheckInput, CheckOperation};
use codecheck_operations::providers::{CommandInspector, FileSystemReportWriter, Git2Provider};
use codecheck_operations::traits::GitProvider;

use super::CheckArgs;
use super::rules::load_catalog;
use crate::config::{Config, DEFAULT_OUTPUT_DIR};
use crate::error::{CliError, Result};
use crate::interrupt::Interrupt;
use crate::output::{OutputFormatter, PlainTextFormatter};

pub(crate) fn run(selector: FileSelector, args: CheckArgs, start_path: &Path) -> Result<()> {
    let git_provider = Git2Provider::new();
    let repo_root = git_provider.repository_root(start_path)?;

    if args.list_files {
        for path in git_provider.resolve_files(&repo_root, &selector)? {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let config = Config::load(args.config.as_deref(), &repo_root)?;
    let options = config.options(&[
        (OptionKey::Repeat, args.repeat.as_deref()),
        (OptionKey::Consensus, args.consensus.as_deref()),
        (OptionKey::Workers, args.workers.as_deref()),
    ]);

    let catalog_path = args.rules.clone().or_else(|| config.catalog_path());
    let catalog = load_catalog(catalog_path.as_deref())?;

    let command = config
        .inspector_command()
        .ok_or(CliError::MissingInspector)?;
    let inspector = CommandInspector::new(command)?.with_timeout(config.inspector_timeout());

    let operation = CheckOperation::new(git_provider, inspector, catalog);
    let input = CheckInput { selector, options };
    let formatter = PlainTextFormatter;
    let interrupt = Interrupt::install();
    let mut last_progress = None;

    let outcome = operation.execute(&repo_root, &input, |progress, result| {
        if !args.quiet {
            eprintln!("{}", formatter.format_progress(progress, result));
        }
        last_progress = Some(progress);
        continue_unless(&interrupt)
    })?;

    if !args.quiet {
        for skipped in &outcome.skipped {
            eprintln!("skipped {}: {}", skipped.path.display(), skipped.reason);
        }
    }
    if let Some(failure) = &outcome.cleanup_failure {
        eprintln!("warning: {failure}: {}", failure.source);
    }

    if outcome.cancelled {
        print!("{}", formatter.format_summary(&outcome, None));
        let BatchProgress { completed, total } =
            last_progress.unwrap_or(BatchProgress { completed: 0, total: 0 });
        return Err(CliError::Interrupted { completed, total });
    }

    let written = if args.no_report {
        None
    } else {
        let output_dir = output_dir(args.output_dir.clone(), &config, &repo_root);
        Some(operation.write_report(&outcome, &FileSystemReportWriter::new(output_dir))?)
    };

    print!("{}", formatter.format_summary(&outcome, written.as_ref()));

    match args.fail_on {
        Some(severity) => check_threshold(&outcome.results, severity),
        None => Ok(()),
    }
}

fn continue_unless(interrupt: &Interrupt) -> ControlFlow<()> {
    if interrupt.is_requested() {
        ControlFlow::Break(())
    } else {
        ControlFlow::Continue(())
    }
}

fn output_dir(flag: Option<PathBuf>, config: &Config, repo_root: &Path) -> PathBuf {
    flag.or_else(|| config.output_dir())
        .unwrap_or_else(|| repo_root.join(DEFAULT_OUTPUT_DIR))
}

fn check_threshold(results: &[InspectionResult], severity: Severity) -> Result<()> {
    let count: usize = results
        .iter()
        .map(|result| result.count_at_or_above(severity))
        .sum();

    if count > 0 {
        Err(CliError::ThresholdExceeded { count, severity })
    } else {
        Ok(())
    }
}
