//! Demo error types.

use std::io;
use std::path::PathBuf;

use amalgo::BuildError;
use thiserror::Error;

/// Errors that can stop the demo.
#[derive(Debug, Error)]
pub enum DemoError {
    /// Terminal or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The options file is not valid JSON for the demo.
    #[error("Failed to parse {path}: {source}")]
    Options {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The combobox could not be mounted.
    #[error("Failed to build combobox: {0}")]
    Build(#[from] BuildError),

    /// A logger was already installed.
    #[error("Failed to initialize logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}
