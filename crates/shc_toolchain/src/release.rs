//! Release descriptions from the GitHub releases API.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ToolchainError;
use crate::version::DxcVersion;

/// Base URL that asset URLs are made relative to.
pub const API_ROOT: &str = "https://api.github.com/";

/// Path of the release listing under [`API_ROOT`].
pub const RELEASES_PATH: &str = "repos/microsoft/DirectXShaderCompiler/releases";

/// A published compiler release with a downloadable zip archive.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DxcRelease {
    /// The release version.
    pub version: DxcVersion,
    /// File name of the zip archive.
    pub asset_name: String,
    /// Download path of the archive, relative to [`API_ROOT`].
    pub download_path: String,
}

/// Path of the latest-release description.
pub fn latest_release_path() -> String {
    format!("{RELEASES_PATH}/latest")
}

/// Path of one tagged release description.
pub fn tagged_release_path(version: DxcVersion) -> String {
    format!("{RELEASES_PATH}/tags/v{version}")
}

#[derive(Deserialize)]
struct RawRelease {
    tag_name: Option<String>,
    #[serde(default)]
    assets: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct RawAsset {
    name: String,
    url: String,
}

/// Parses one release object.
pub fn parse_release(json: &str) -> Result<DxcRelease, ToolchainError> {
    let value: Value = serde_json::from_str(json).map_err(invalid)?;
    release_from_value(value)
}

/// Parses a release listing, skipping releases without a version tag or zip
/// archive. The result is sorted newest first.
pub fn parse_release_listing(json: &str) -> Result<Vec<DxcRelease>, ToolchainError> {
    let value: Value = serde_json::from_str(json).map_err(invalid)?;
    let Value::Array(entries) = value else {
        return Err(ToolchainError::InvalidRelease {
            reason: "release listing is not an array".to_string(),
        });
    };

    let mut releases: Vec<DxcRelease> = entries
        .into_iter()
        .filter_map(|entry| match release_from_value(entry) {
            Ok(release) => Some(release),
            Err(e) => {
                log::debug!("skipping release: {e}");
                None
            }
        })
        .collect();
    releases.sort_by(|a, b| b.version.cmp(&a.version));
    Ok(releases)
}

fn release_from_value(value: Value) -> Result<DxcRelease, ToolchainError> {
    let raw: RawRelease = serde_json::from_value(value).map_err(invalid)?;
    let tag = raw.tag_name.ok_or_else(|| ToolchainError::InvalidRelease {
        reason: "missing tag_name".to_string(),
    })?;
    let version: DxcVersion = tag.parse()?;
    let assets = raw.assets.ok_or_else(|| ToolchainError::InvalidRelease {
        reason: format!("release {tag} has no assets"),
    })?;

    assets
        .into_iter()
        .filter_map(|asset| serde_json::from_value::<RawAsset>(asset).ok())
        .filter(|asset| asset.name.starts_with("dxc") && asset.name.ends_with(".zip"))
        .find_map(|asset| {
            let download_path = asset.url.strip_prefix(API_ROOT)?.to_string();
            Some(DxcRelease {
                version,
                asset_name: asset.name,
                download_path,
            })
        })
        .ok_or_else(|| ToolchainError::InvalidRelease {
            reason: format!("release {tag} has no dxc zip archive"),
        })
}

fn invalid(e: serde_json::Error) -> ToolchainError {
    ToolchainError::InvalidRelease {
        reason: e.to_string(),
    }
}
