//! Error types for process execution.

/// Errors that prevent a child process from being run.
///
/// A child that runs and exits with a non-zero code is not an error; the
/// code is returned to the caller from [`Process::execute`](crate::Process::execute).
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// The output or input pipe for the child could not be created.
    #[error("failed to create child pipes: {0}")]
    BrokenPipe(#[source] std::io::Error),

    /// The child process could not be started.
    #[error("failed to spawn `{command}`: {source}")]
    SpawnFailed {
        /// The command that was being spawned.
        command: String,
        /// The underlying OS error.
        source: std::io::Error,
    },
}
