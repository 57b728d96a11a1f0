//! Published releases, fetched through a caller-supplied transport.

use std::path::{Path, PathBuf};

use crate::error::ToolchainError;
use crate::local::{compiler_binary, installation_dir_name};
use crate::release::{
    latest_release_path, parse_release, parse_release_listing, tagged_release_path, DxcRelease,
    RELEASES_PATH,
};
use crate::version::DxcVersion;

/// `Accept` header value for release descriptions.
pub const ACCEPT_JSON: &str = "application/vnd.github+json";

/// `Accept` header value for archive downloads.
pub const ACCEPT_BINARY: &str = "application/octet-stream";

/// Fetches resources by path relative to the releases API root.
pub trait ReleaseTransport {
    /// Fetches `path`, asking for the given content type.
    fn get(&mut self, path: &str, accept: &str) -> Result<Vec<u8>, ToolchainError>;
}

/// Somewhere compiler versions can be listed and installations found.
pub trait ReleaseSource {
    /// Every available version, newest first.
    fn versions(&mut self) -> Result<Vec<DxcVersion>, ToolchainError>;

    /// The newest available version.
    fn latest(&mut self) -> Result<DxcVersion, ToolchainError>;

    /// The zip archive of one version.
    fn fetch_archive(&mut self, version: DxcVersion) -> Result<Vec<u8>, ToolchainError>;

    /// The directory an installation of `version` lives in.
    fn installation_dir(&self, version: DxcVersion) -> PathBuf;
}

/// Known releases, kept sorted newest first.
pub struct ReleaseCatalog<T: ReleaseTransport> {
    transport: T,
    download_dir: PathBuf,
    releases: Vec<DxcRelease>,
}

impl<T: ReleaseTransport> ReleaseCatalog<T> {
    /// Creates an empty catalog whose installations go under `download_dir`.
    pub fn new(transport: T, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            download_dir: download_dir.into(),
            releases: Vec::new(),
        }
    }

    /// Replaces the known releases with the full published listing.
    pub fn query_available_releases(&mut self) -> Result<&[DxcRelease], ToolchainError> {
        let body = self.transport.get(RELEASES_PATH, ACCEPT_JSON)?;
        let releases = parse_release_listing(&String::from_utf8_lossy(&body))?;
        if releases.is_empty() {
            return Err(ToolchainError::NoReleases);
        }
        self.releases = releases;
        Ok(&self.releases)
    }

    /// Fetches the latest release, adding it if it is newer than every
    /// known one, and returns the newest known version.
    pub fn query_latest_release(&mut self) -> Result<DxcVersion, ToolchainError> {
        let body = self.transport.get(&latest_release_path(), ACCEPT_JSON)?;
        let latest = parse_release(&String::from_utf8_lossy(&body))?;
        if self.latest_version().is_none_or(|newest| latest.version > newest) {
            self.releases.insert(0, latest);
        }
        self.latest_version().ok_or(ToolchainError::NoReleases)
    }

    /// Makes sure `version` is known, fetching its description if needed.
    pub fn query_release(&mut self, version: DxcVersion) -> Result<&DxcRelease, ToolchainError> {
        if !self.is_release_available(version) {
            let body = self.transport.get(&tagged_release_path(version), ACCEPT_JSON)?;
            let release = parse_release(&String::from_utf8_lossy(&body))?;
            if release.version != version {
                return Err(ToolchainError::UnknownVersion(version));
            }
            self.releases.push(release);
            self.releases.sort_by(|a, b| b.version.cmp(&a.version));
        }
        self.release(version).ok_or(ToolchainError::UnknownVersion(version))
    }

    /// Known releases, newest first.
    pub fn releases(&self) -> &[DxcRelease] {
        &self.releases
    }

    /// The known release with `version`.
    pub fn release(&self, version: DxcVersion) -> Option<&DxcRelease> {
        self.releases.iter().find(|r| r.version == version)
    }

    /// Known versions, newest first.
    pub fn available_versions(&self) -> Vec<DxcVersion> {
        self.releases.iter().map(|r| r.version).collect()
    }

    /// The newest known version.
    pub fn latest_version(&self) -> Option<DxcVersion> {
        self.releases.first().map(|r| r.version)
    }

    /// Returns `true` if `version` is known.
    pub fn is_release_available(&self, version: DxcVersion) -> bool {
        self.release(version).is_some()
    }

    /// The directory installations are placed under.
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Returns `true` if `version` is unpacked in its installation directory.
    pub fn is_installed(&self, version: DxcVersion) -> bool {
        compiler_binary(&self.installation_dir(version)).is_file()
    }
}

impl<T: ReleaseTransport> ReleaseSource for ReleaseCatalog<T> {
    fn versions(&mut self) -> Result<Vec<DxcVersion>, ToolchainError> {
        if self.releases.is_empty() {
            self.query_available_releases()?;
        }
        Ok(self.available_versions())
    }

    fn latest(&mut self) -> Result<DxcVersion, ToolchainError> {
        self.query_latest_release()
    }

    fn fetch_archive(&mut self, version: DxcVersion) -> Result<Vec<u8>, ToolchainError> {
        let path = self.query_release(version)?.download_path.clone();
        log::debug!("downloading dxc {version} from {path}");
        self.transport.get(&path, ACCEPT_BINARY)
    }

    fn installation_dir(&self, version: DxcVersion) -> PathBuf {
        self.download_dir.join(installation_dir_name(version))
    }
}
