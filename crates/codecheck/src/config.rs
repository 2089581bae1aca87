//! `codecheck.toml` loading.
//!
//! Settings are layered: built-in defaults, then the config file, then
//! command-line flags. Option values from every layer are validated the
//! same way, and a rejected value leaves the previous layer's value in
//! place.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use codecheck_core::{CheckerOptions, OptionKey};
use codecheck_operations::providers::DEFAULT_INSPECTOR_TIMEOUT;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{CliError, Result};

pub(crate) const CONFIG_FILE_NAME: &str = "codecheck.toml";
pub(crate) const DEFAULT_OUTPUT_DIR: &str = "codecheck-reports";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigFile {
    options: OptionsSection,
    inspector: InspectorSection,
    rules: RulesSection,
    report: ReportSection,
}

/// Kept as raw TOML values so they go through the same validation as
/// command-line strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct OptionsSection {
    repeat: Option<toml::Value>,
    consensus: Option<toml::Value>,
    workers: Option<toml::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct InspectorSection {
    command: Vec<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RulesSection {
    catalog: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct ReportSection {
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub(crate) struct Config {
    /// Directory relative paths in the file are resolved against.
    base_dir: PathBuf,
    file: ConfigFile,
}

impl Config {
    /// Reads `explicit` if given, otherwise `codecheck.toml` in the
    /// repository root when present.
    pub(crate) fn load(explicit: Option<&Path>, repo_root: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = repo_root.join(CONFIG_FILE_NAME);
                if !default.is_file() {
                    debug!(path = %default.display(), "no config file");
                    return Ok(Self {
                        base_dir: repo_root.to_path_buf(),
                        file: ConfigFile::default(),
                    });
                }
                default
            }
        };

        let content = fs::read_to_string(&path).map_err(|source| CliError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::parse(&content, &path)
    }

    pub(crate) fn parse(content: &str, path: &Path) -> Result<Self> {
        let file = toml::from_str(content).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(Self { base_dir, file })
    }

    pub(crate) fn inspector_command(&self) -> Option<&[String]> {
        let command = self.file.inspector.command.as_slice();
        (!command.is_empty()).then_some(command)
    }

    pub(crate) fn inspector_timeout(&self) -> Duration {
        match self.file.inspector.timeout_secs {
            Some(0) => {
                warn!("ignoring inspector timeout of 0 seconds");
                DEFAULT_INSPECTOR_TIMEOUT
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_INSPECTOR_TIMEOUT,
        }
    }

    pub(crate) fn catalog_path(&self) -> Option<PathBuf> {
        self.file
            .rules
            .catalog
            .as_ref()
            .map(|path| self.base_dir.join(path))
    }

    pub(crate) fn output_dir(&self) -> Option<PathBuf> {
        self.file
            .report
            .output_dir
            .as_ref()
            .map(|path| self.base_dir.join(path))
    }

    /// Builds run options from defaults, the file's `[options]` table, and
    /// then `overrides` from the command line.
    pub(crate) fn options(&self, overrides: &[(OptionKey, Option<&str>)]) -> CheckerOptions {
        let mut options = CheckerOptions::default();
        let section = &self.file.options;

        let from_file = [
            (OptionKey::Repeat, section.repeat.as_ref()),
            (OptionKey::Consensus, section.consensus.as_ref()),
            (OptionKey::Workers, section.workers.as_ref()),
        ];
        for (key, value) in from_file.iter().filter_map(|(k, v)| v.map(|v| (*k, v))) {
            apply_option(&mut options, key, &raw_value(value), CONFIG_FILE_NAME);
        }

        for (key, raw) in overrides.iter().filter_map(|(k, v)| v.map(|v| (*k, v))) {
            apply_option(&mut options, key, raw, "command line");
        }

        options
    }
}

fn raw_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn apply_option(options: &mut CheckerOptions, key: OptionKey, raw: &str, origin: &str) {
    if let Err(err) = options.apply(key, raw) {
        warn!(%key, value = raw, origin, "rejected option value");
        eprintln!("warning: {err} ({origin}), keeping {key} = {}", current(options, key));
    }
}

fn current(options: &CheckerOptions, key: OptionKey) -> String {
    match key {
        OptionKey::Repeat => options.repeat().to_string(),
        OptionKey::Consensus => options.consensus().to_string(),
        OptionKey::Workers => options.workers().to_string(),
    }
}
