//! Error types for compile calls.

use std::path::PathBuf;

use shc_process::ProcessError;

/// Errors that prevent a compile call from producing a
/// [`CompileSummary`](crate::CompileSummary).
///
/// Errors reported by the compiler itself are not in this enum; they arrive
/// as messages in a successful summary.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The compiler process could not be started.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Staging a temporary file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The file being written or read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The in-process compiler could not be created or failed to run.
    #[error("compiler library is not usable: {0}")]
    StateNotRecoverable(#[source] NativeError),

    /// The compiler library could not load the source file.
    #[error("no such file: {path}")]
    NoSuchFile {
        /// The path that failed to load.
        path: PathBuf,
    },
}

/// A failure reported by a compiler library binding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct NativeError {
    /// What the library reported.
    pub message: String,
}

impl NativeError {
    /// Creates an error with the given description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
