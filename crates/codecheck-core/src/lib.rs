pub mod error;
mod options;
mod rules;
mod selector;
pub mod types;

pub use error::*;
pub use options::{CheckerOptions, OptionKey};
pub use rules::{Rule, RuleCatalog};
pub use selector::{FileSelector, GitContext, ResolvedFile, SelectorKind};
pub use types::*;

/// Largest file, in bytes, that is handed to an inspector.
pub const MAX_INSPECTED_BYTES: u64 = 10 * 1024 * 1024;
