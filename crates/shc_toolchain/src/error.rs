//! Error types for toolchain lookup.

use std::path::PathBuf;

use crate::version::DxcVersion;

/// Errors that can occur while listing, resolving or fetching toolchains.
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    /// A version string is not of the form `[v]major.minor.micro[.patch]`.
    #[error("invalid version `{0}`")]
    InvalidVersion(String),

    /// A release description is malformed or has no usable archive.
    #[error("invalid release description: {reason}")]
    InvalidRelease {
        /// What was wrong with it.
        reason: String,
    },

    /// The transport failed to fetch a resource.
    #[error("failed to fetch `{path}`: {reason}")]
    Transport {
        /// The requested path.
        path: String,
        /// Description of the failure.
        reason: String,
    },

    /// No release with this version is known.
    #[error("no release {0} available")]
    UnknownVersion(DxcVersion),

    /// No releases are known at all.
    #[error("no releases available")]
    NoReleases,

    /// This source cannot provide release archives.
    #[error("no archive available for release {0}")]
    ArchiveUnavailable(DxcVersion),

    /// An I/O error occurred while inspecting installations.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
