//! CLI error types and their miette rendering.

use std::path::PathBuf;

use miette::Report;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// The merged configuration could not be deserialized
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String, hint: String },

    /// An explicitly requested file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The build itself failed
    #[error(transparent)]
    Build(#[from] fob_rsc::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Convert a CLI error into a miette report.
///
/// Build errors keep their own diagnostic codes and help text.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(e) => Report::new(e),
        CliError::InvalidConfig { message, hint } => {
            miette::miette!(
                code = "INVALID_CONFIG",
                help = hint,
                "Invalid configuration: {}",
                message
            )
        }
        CliError::FileNotFound(path) => miette::miette!(
            code = "FILE_NOT_FOUND",
            help = "Pass an existing file to --config, or omit it to use fob-rsc.config.json",
            "File not found: {}",
            path.display()
        ),
        other => miette::miette!("{}", other),
    }
}
