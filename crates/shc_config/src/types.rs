//! Configuration types deserialized from `shc.toml`.

use std::path::{Path, PathBuf};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use shc_compiler::{ArtifactKind, StagingCleanup, TargetProfile};

/// The top-level configuration parsed from `shc.toml`.
///
/// Every section is optional; an empty file is a valid configuration.
#[derive(Debug, Default, Deserialize)]
pub struct ShcConfig {
    /// Which compiler to run.
    #[serde(default)]
    pub compiler: CompilerConfig,
    /// Defaults applied to every compile.
    #[serde(default)]
    pub shader: ShaderConfig,
    /// Artifact destinations.
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    /// Temporary file handling.
    #[serde(default)]
    pub staging: StagingConfig,
}

impl ShcConfig {
    /// Makes every relative path in the configuration relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        if let Some(path) = self.compiler.path.as_mut() {
            resolve(path);
        }
        if let Some(dir) = self.compiler.toolchain_dir.as_mut() {
            resolve(dir);
        }
        for sink in self.artifacts.slots_mut() {
            if let Some(ArtifactSink::File(path)) = sink {
                resolve(path);
            }
        }
    }
}

/// The compiler executable or installation to use.
#[derive(Debug, Default, Deserialize)]
pub struct CompilerConfig {
    /// Which backend drives the compiler.
    #[serde(default)]
    pub backend: Backend,
    /// Path to the compiler executable.
    pub path: Option<PathBuf>,
    /// Directory holding `dxc-<version>` installations; the newest is used.
    pub toolchain_dir: Option<PathBuf>,
}

/// How the compiler is invoked.
#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Spawn the compiler executable (default).
    #[default]
    External,
    /// Call into the compiler library in-process.
    Library,
}

/// Settings applied to every compile.
#[derive(Debug, Default, Deserialize)]
pub struct ShaderConfig {
    /// Target profile, passed with `-T`.
    pub profile: Option<TargetProfile>,
    /// Entry point, passed with `-E`.
    pub entry: Option<String>,
    /// Extra argument tokens passed verbatim.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Destination of each artifact kind. Unlisted kinds are not produced.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactsConfig {
    /// Disassembly (`-Fc`).
    pub assembly_listing: Option<ArtifactSink>,
    /// Debug information (`-Fd`).
    pub debug_info: Option<ArtifactSink>,
    /// Compiled object (`-Fo`).
    pub object: Option<ArtifactSink>,
    /// Reflection data (`-Fre`).
    pub reflection: Option<ArtifactSink>,
    /// Root signature (`-Frs`).
    pub root_signature: Option<ArtifactSink>,
    /// Shader hash (`-Fsh`).
    pub hash: Option<ArtifactSink>,
}

impl ArtifactsConfig {
    /// The configured destination of `kind`.
    pub fn get(&self, kind: ArtifactKind) -> Option<&ArtifactSink> {
        match kind {
            ArtifactKind::AssemblyListing => self.assembly_listing.as_ref(),
            ArtifactKind::DebugInfo => self.debug_info.as_ref(),
            ArtifactKind::Object => self.object.as_ref(),
            ArtifactKind::Reflection => self.reflection.as_ref(),
            ArtifactKind::RootSignature => self.root_signature.as_ref(),
            ArtifactKind::Hash => self.hash.as_ref(),
        }
    }

    /// Every configured kind with its destination, in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (ArtifactKind, &ArtifactSink)> {
        ArtifactKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|sink| (kind, sink)))
    }

    fn slots_mut(&mut self) -> [&mut Option<ArtifactSink>; 6] {
        [
            &mut self.assembly_listing,
            &mut self.debug_info,
            &mut self.object,
            &mut self.reflection,
            &mut self.root_signature,
            &mut self.hash,
        ]
    }
}

/// Where one artifact goes.
///
/// Written in TOML as either the string `"memory"` or a file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSink {
    /// Keep the output in memory.
    Memory,
    /// Write the output to this file.
    File(PathBuf),
}

impl ArtifactSink {
    /// The keyword that selects a memory sink.
    pub const MEMORY: &'static str = "memory";

    /// Parses `"memory"` or a path.
    pub fn parse(text: &str) -> Self {
        if text == Self::MEMORY {
            ArtifactSink::Memory
        } else {
            ArtifactSink::File(PathBuf::from(text))
        }
    }
}

impl<'de> Deserialize<'de> for ArtifactSink {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SinkVisitor;

        impl Visitor<'_> for SinkVisitor {
            type Value = ArtifactSink;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("\"memory\" or a file path")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(ArtifactSink::parse(v))
            }
        }

        deserializer.deserialize_str(SinkVisitor)
    }
}

/// Temporary file handling.
#[derive(Debug, Default, Deserialize)]
pub struct StagingConfig {
    /// Whether staged files are deleted after each compile.
    #[serde(default)]
    pub cleanup: StagingCleanup,
}
