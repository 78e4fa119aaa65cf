//! Fatal error types for a lint invocation.
//!
//! Only local I/O and configuration problems are fatal. Rule failures stay
//! rule-local and never surface through `LintError`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a lint invocation.
#[derive(Debug, Error)]
pub enum LintError {
    /// A required input file could not be read
    #[error("cannot read {what} '{}': {source}", path.display())]
    Read {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required input file could not be parsed
    #[error("{what} '{}' is not valid {format}: {message}", path.display())]
    Parse {
        what: &'static str,
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    /// A setting has an unusable value
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A custom AI rule failed eager validation
    #[error("custom rule '{id}': {message}")]
    CustomRule { id: String, message: String },

    /// A code file glob pattern is malformed
    #[error("invalid file pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// Report file could not be written
    #[error("cannot write report '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, LintError>;
