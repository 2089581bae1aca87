use std::fs;
use std::path::Path;

use codecheck_core::{Rule, RuleCatalog};

use super::{RulesArgs, RulesFormat};
use crate::error::{CliError, Result};
use crate::output::{OutputFormatter, PlainTextFormatter};

pub(crate) fn run(args: &RulesArgs) -> Result<()> {
    let catalog = load_catalog(args.rules.as_deref())?;

    match args.format {
        RulesFormat::Text => print!("{}", PlainTextFormatter.format_rules(&catalog)),
        RulesFormat::Json => {
            let rules: Vec<&Rule> = catalog.iter().collect();
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
    }
    Ok(())
}

/// Loads the catalog at `path`, or the bundled catalog when `None`.
pub(crate) fn load_catalog(path: Option<&Path>) -> Result<RuleCatalog> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| CliError::CatalogRead {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(RuleCatalog::from_toml(&content)?)
        }
        None => Ok(RuleCatalog::bundled()?),
    }
}
