//! Errors from reading and checking `shc.toml`.

use std::path::PathBuf;

/// Why a shader configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying OS error.
        source: std::io::Error,
    },

    /// The current directory, where `shc.toml` is looked up, is unavailable.
    #[error("cannot determine the working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    /// The TOML is malformed or names an unknown profile, artifact kind or
    /// option.
    #[error("{origin}: {message}")]
    Parse {
        /// The file path, or `shc.toml` for configuration given as a string.
        origin: String,
        /// The TOML deserializer's description.
        message: String,
    },

    /// Both an explicit compiler path and a toolchain directory are set.
    #[error("compiler.path and compiler.toolchain_dir cannot both be set")]
    ConflictingCompiler,

    /// A key that must hold text is empty, such as `shader.entry` or an
    /// `artifacts.<kind>` file sink.
    #[error("{key} is empty")]
    EmptyValue {
        /// The dotted key, e.g. `artifacts.object`.
        key: String,
    },
}
