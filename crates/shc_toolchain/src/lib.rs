//! Locating DXC toolchains: release versions, release listings and
//! installations on disk.
//!
//! Fetching bytes over the network and unpacking archives are left to the
//! caller: a [`ReleaseTransport`] supplies raw responses, and a
//! [`ReleaseSource`] hands out the directory an installation lives in.

#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod local;
pub mod release;
pub mod version;

pub use catalog::{ReleaseCatalog, ReleaseSource, ReleaseTransport};
pub use error::ToolchainError;
pub use local::{compiler_binary, installation_dir_name, LocalReleaseSource};
pub use release::{parse_release, parse_release_listing, DxcRelease};
pub use version::DxcVersion;
