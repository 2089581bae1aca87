use std::path::PathBuf;
use std::process::ExitCode;

use codecheck_core::Severity;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Operation(#[from] codecheck_operations::OperationError),

    #[error("invalid rule catalog")]
    Catalog(#[from] codecheck_core::CatalogError),

    #[error("failed to read rule catalog '{path}'")]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read config file '{path}'")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}'")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("no inspector configured: set [inspector] command in codecheck.toml")]
    MissingInspector,

    #[error("{count} issue(s) at or above severity '{severity}'")]
    ThresholdExceeded { count: usize, severity: Severity },

    #[error("interrupted after {completed} of {total} file(s); no report written")]
    Interrupted { completed: usize, total: usize },

    #[error("failed to serialize rule catalog")]
    Json(#[from] serde_json::Error),

    #[error("failed to determine current directory")]
    CurrentDir(#[source] std::io::Error),
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Interrupted { .. } => ExitCode::from(crate::interrupt::INTERRUPTED_EXIT_CODE),
            _ => ExitCode::FAILURE,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::CliError;
    use codecheck_core::Severity;

    #[test]
    fn operation_errors_keep_their_message() {
        let err: CliError = codecheck_operations::OperationError::EmptyInspectorCommand.into();

        assert_eq!(err.to_string(), "inspector command is empty");
    }

    #[test]
    fn config_read_error_names_path_and_keeps_source() {
        let err = CliError::ConfigRead {
            path: PathBuf::from("/repo/codecheck.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };

        assert!(err.to_string().contains("/repo/codecheck.toml"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn threshold_message_names_severity() {
        let err = CliError::ThresholdExceeded {
            count: 3,
            severity: Severity::Warning,
        };

        assert_eq!(err.to_string(), "3 issue(s) at or above severity 'warning'");
    }

    #[test]
    fn missing_inspector_points_at_config_file() {
        assert!(CliError::MissingInspector.to_string().contains("codecheck.toml"));
    }

    #[test]
    fn interrupted_run_exits_with_signal_status() {
        let err = CliError::Interrupted {
            completed: 2,
            total: 7,
        };

        assert_eq!(err.to_string(), "interrupted after 2 of 7 file(s); no report written");
        assert_eq!(err.exit_code(), std::process::ExitCode::from(130));
        assert_eq!(CliError::MissingInspector.exit_code(), std::process::ExitCode::FAILURE);
    }
}
