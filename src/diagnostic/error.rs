//! Fatal error type.
//!
//! Type and syntax errors in a snippet are *not* errors at this level: they
//! are returned as [`Diagnostic`](super::Diagnostic)s on each transpiled
//! file. `CompileError` covers what aborts a request.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::service::HostError;

/// Error aborting a compile request or compiler setup.
///
/// # Example
///
/// ```ignore
/// match compiler.compile(&files) {
///     Ok(transpiled) => { /* render, fail on diagnostics */ }
///     Err(CompileError::Resolution(err)) => {
///         eprintln!("misconfigured external resolution: {err}");
///     }
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum CompileError {
    /// Compiler configuration could not be parsed.
    #[error("invalid compiler configuration {}: {message}", path.display())]
    Config {
        /// Offending config file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A required file exists neither in the overlay nor on disk.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The host aborted the request (e.g. broken external resolution).
    #[error(transparent)]
    Resolution(#[from] HostError),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    /// Create a configuration error.
    pub fn config(path: &Path, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Whether the error stems from configuration rather than I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Resolution(_))
    }
}
