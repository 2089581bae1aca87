mod check;
mod rules;

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use codecheck_core::{FileSelector, Severity};

use crate::error::Result;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Inspect files staged in the index
    Staged(CheckArgs),
    /// Inspect tracked files modified in the working tree
    Unstaged(CheckArgs),
    /// Inspect the files changed by a commit
    Commit(CommitArgs),
    /// Inspect the files that differ between two revisions
    Diff(DiffArgs),
    /// Print the rule catalog
    Rules(RulesArgs),
}

#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Inspections per file (default: 1)
    #[arg(long, value_name = "N")]
    pub repeat: Option<String>,

    /// Fraction of repeated inspections an issue must appear in (default: 0.5)
    #[arg(long, value_name = "FRACTION")]
    pub consensus: Option<String>,

    /// Files inspected concurrently (default: 5)
    #[arg(long, value_name = "N")]
    pub workers: Option<String>,

    /// Config file to use instead of codecheck.toml in the repository root
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Rule catalog to use instead of the bundled one
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Directory the report is written to
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print the summary without writing report files
    #[arg(long)]
    pub no_report: bool,

    /// List the selected files without inspecting them
    #[arg(long)]
    pub list_files: bool,

    /// Exit with an error if any issue at or above this severity is found
    #[arg(long, value_enum, value_name = "SEVERITY")]
    pub fail_on: Option<Severity>,

    /// Suppress per-file progress output
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args)]
pub(crate) struct CommitArgs {
    /// Commit to inspect (hash or any revision)
    pub commit: String,

    #[command(flatten)]
    pub check: CheckArgs,
}

#[derive(Args)]
pub(crate) struct DiffArgs {
    /// Base revision
    pub base: String,

    /// Target revision (default: HEAD)
    pub target: Option<String>,

    #[command(flatten)]
    pub check: CheckArgs,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum RulesFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub(crate) struct RulesArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: RulesFormat,

    /// Rule catalog to print instead of the bundled one
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,
}

impl Commands {
    pub(crate) fn execute(self, start_path: &Path) -> Result<()> {
        match self {
            Self::Staged(args) => check::run(FileSelector::Staged, args, start_path),
            Self::Unstaged(args) => check::run(FileSelector::Unstaged, args, start_path),
            Self::Commit(args) => check::run(
                FileSelector::Commit {
                    commit: args.commit,
                },
                args.check,
                start_path,
            ),
            Self::Diff(args) => check::run(
                FileSelector::Diff {
                    base: args.base,
                    target: args.target,
                },
                args.check,
                start_path,
            ),
            Self::Rules(args) => rules::run(&args),
        }
    }
}
