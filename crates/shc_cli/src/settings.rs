//! Merging `shc.toml` with command-line overrides.

use std::path::{Path, PathBuf};

use shc_compiler::{ArtifactKind, TargetProfile};
use shc_config::{ArtifactSink, CompilerConfig, ConfigError, ShcConfig, CONFIG_FILE_NAME};
use shc_toolchain::{compiler_binary, LocalReleaseSource, ReleaseSource, ToolchainError};

use crate::GlobalArgs;

/// Executable run when neither a path nor a toolchain directory is configured.
const DEFAULT_COMPILER: &str = "dxc";

/// Loads `--config`, or `shc.toml` from the current directory if present.
///
/// Without either, the default configuration is used.
pub fn load_settings(global: &GlobalArgs) -> Result<ShcConfig, ConfigError> {
    if let Some(path) = &global.config {
        return shc_config::load_config_file(Path::new(path));
    }
    let cwd = std::env::current_dir().map_err(ConfigError::WorkingDirectory)?;
    if cwd.join(CONFIG_FILE_NAME).is_file() {
        shc_config::load_config(&cwd)
    } else {
        Ok(ShcConfig::default())
    }
}

/// The compiler executable named by the configuration.
///
/// A toolchain directory resolves to the newest installation inside it.
pub fn resolve_executable(compiler: &CompilerConfig) -> Result<PathBuf, ToolchainError> {
    if let Some(path) = &compiler.path {
        return Ok(path.clone());
    }
    match &compiler.toolchain_dir {
        Some(dir) => {
            let mut source = LocalReleaseSource::new(dir);
            let version = source.latest()?;
            log::debug!("using dxc {version} from {}", dir.display());
            Ok(compiler_binary(&source.installation_dir(version)))
        }
        None => Ok(PathBuf::from(DEFAULT_COMPILER)),
    }
}

/// Parses a `--profile` value.
pub fn parse_profile(text: &str) -> Result<TargetProfile, String> {
    text.parse().map_err(|e| format!("{e}"))
}

/// Parses `kind=path` or `kind=memory`.
pub fn parse_artifact_spec(spec: &str) -> Result<(ArtifactKind, ArtifactSink), String> {
    let (kind, dest) = spec
        .split_once('=')
        .ok_or_else(|| format!("artifact `{spec}` is not of the form KIND=DEST"))?;
    let kind: ArtifactKind = kind.parse().map_err(|e| format!("{e}"))?;
    if dest.is_empty() {
        return Err(format!("artifact `{spec}` has an empty destination"));
    }
    Ok((kind, ArtifactSink::parse(dest)))
}

/// Artifact destinations from the configuration with command-line specs
/// applied on top, in kind order.
pub fn merged_artifacts(
    config: &ShcConfig,
    specs: &[String],
) -> Result<Vec<(ArtifactKind, ArtifactSink)>, String> {
    let mut sinks: Vec<Option<ArtifactSink>> = ArtifactKind::ALL
        .iter()
        .map(|&kind| config.artifacts.get(kind).cloned())
        .collect();
    for spec in specs {
        let (kind, sink) = parse_artifact_spec(spec)?;
        sinks[kind.index()] = Some(sink);
    }
    Ok(ArtifactKind::ALL
        .into_iter()
        .zip(sinks)
        .filter_map(|(kind, sink)| sink.map(|sink| (kind, sink)))
        .collect())
}
