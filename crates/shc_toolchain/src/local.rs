//! Compiler installations already unpacked on disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::ReleaseSource;
use crate::error::ToolchainError;
use crate::version::DxcVersion;

const INSTALLATION_PREFIX: &str = "dxc-";

/// Directory name of an installation, `dxc-<version>`.
pub fn installation_dir_name(version: DxcVersion) -> String {
    format!("{INSTALLATION_PREFIX}{version}")
}

/// The compiler executable inside an installation directory.
pub fn compiler_binary(installation: &Path) -> PathBuf {
    if cfg!(windows) {
        installation.join("bin").join("x64").join("dxc.exe")
    } else {
        installation.join("bin").join("dxc")
    }
}

/// Installations found under one directory.
///
/// Every subdirectory named `dxc-<version>` that contains a compiler
/// executable counts as an installation.
#[derive(Clone, Debug)]
pub struct LocalReleaseSource {
    root: PathBuf,
}

impl LocalReleaseSource {
    /// Creates a source scanning `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The scanned directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scans for installations, newest first.
    pub fn installed_versions(&self) -> Result<Vec<DxcVersion>, ToolchainError> {
        let entries = fs::read_dir(&self.root).map_err(|source| ToolchainError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ToolchainError::Io {
                path: self.root.clone(),
                source,
            })?;
            let name = entry.file_name();
            let Some(version) = name
                .to_str()
                .and_then(|name| name.strip_prefix(INSTALLATION_PREFIX))
                .and_then(|version| version.parse::<DxcVersion>().ok())
            else {
                continue;
            };
            if compiler_binary(&entry.path()).is_file() {
                versions.push(version);
            } else {
                log::debug!("{} has no compiler executable", entry.path().display());
            }
        }
        versions.sort_by(|a, b| b.cmp(a));
        Ok(versions)
    }
}

impl ReleaseSource for LocalReleaseSource {
    fn versions(&mut self) -> Result<Vec<DxcVersion>, ToolchainError> {
        self.installed_versions()
    }

    fn latest(&mut self) -> Result<DxcVersion, ToolchainError> {
        self.installed_versions()?
            .first()
            .copied()
            .ok_or(ToolchainError::NoReleases)
    }

    fn fetch_archive(&mut self, version: DxcVersion) -> Result<Vec<u8>, ToolchainError> {
        Err(ToolchainError::ArchiveUnavailable(version))
    }

    fn installation_dir(&self, version: DxcVersion) -> PathBuf {
        self.root.join(installation_dir_name(version))
    }
}
