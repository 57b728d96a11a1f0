//! Secondary compiler outputs and where each one is routed.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A secondary output a compile call can produce besides messages.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Disassembled DXIL.
    AssemblyListing,
    /// Debug information (PDB).
    DebugInfo,
    /// The compiled shader object.
    Object,
    /// Shader reflection data.
    Reflection,
    /// The serialized root signature.
    RootSignature,
    /// The shader hash.
    Hash,
}

impl ArtifactKind {
    /// Every kind, in declaration order.
    pub const ALL: [ArtifactKind; 6] = [
        ArtifactKind::AssemblyListing,
        ArtifactKind::DebugInfo,
        ArtifactKind::Object,
        ArtifactKind::Reflection,
        ArtifactKind::RootSignature,
        ArtifactKind::Hash,
    ];

    /// The command-line flag that names this output's destination file.
    pub fn flag(self) -> &'static str {
        match self {
            ArtifactKind::AssemblyListing => "-Fc",
            ArtifactKind::DebugInfo => "-Fd",
            ArtifactKind::Object => "-Fo",
            ArtifactKind::Reflection => "-Fre",
            ArtifactKind::RootSignature => "-Frs",
            ArtifactKind::Hash => "-Fsh",
        }
    }

    /// The snake_case name used in configuration files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            ArtifactKind::AssemblyListing => "assembly_listing",
            ArtifactKind::DebugInfo => "debug_info",
            ArtifactKind::Object => "object",
            ArtifactKind::Reflection => "reflection",
            ArtifactKind::RootSignature => "root_signature",
            ArtifactKind::Hash => "hash",
        }
    }

    /// Position of this kind in [`ALL`](Self::ALL).
    pub fn index(self) -> usize {
        match self {
            ArtifactKind::AssemblyListing => 0,
            ArtifactKind::DebugInfo => 1,
            ArtifactKind::Object => 2,
            ArtifactKind::Reflection => 3,
            ArtifactKind::RootSignature => 4,
            ArtifactKind::Hash => 5,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing an unknown artifact kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown artifact kind `{0}`")]
pub struct UnknownArtifactKind(pub String);

impl FromStr for ArtifactKind {
    type Err = UnknownArtifactKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArtifactKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownArtifactKind(s.to_string()))
    }
}

/// The current binding of one artifact kind.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum Artifact {
    /// Not requested.
    #[default]
    Empty,
    /// Written by the compiler to this path.
    File(PathBuf),
    /// Requested in memory, not yet produced.
    PendingMemory,
    /// Produced in memory by the last compile call.
    Memory(Vec<u8>),
}

impl Artifact {
    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        matches!(self, Artifact::Empty)
    }

    /// Returns `true` if the caller asked for this output in memory.
    ///
    /// A buffer left over from an earlier call still counts as a request.
    pub fn is_memory_request(&self) -> bool {
        matches!(self, Artifact::PendingMemory | Artifact::Memory(_))
    }

    /// The destination file, for file bindings.
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            Artifact::File(path) => Some(path),
            _ => None,
        }
    }

    /// The produced bytes, for filled memory bindings.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Artifact::Memory(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// One binding per [`ArtifactKind`].
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ArtifactTable {
    slots: [Artifact; ArtifactKind::ALL.len()],
}

impl ArtifactTable {
    /// Creates a table with every kind [`Empty`](Artifact::Empty).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the binding for `kind`.
    pub fn get(&self, kind: ArtifactKind) -> &Artifact {
        &self.slots[kind.index()]
    }

    /// Replaces the binding for `kind`, returning the previous one.
    pub fn replace(&mut self, kind: ArtifactKind, artifact: Artifact) -> Artifact {
        std::mem::replace(&mut self.slots[kind.index()], artifact)
    }

    /// Takes the binding for `kind`, leaving it empty.
    pub fn take(&mut self, kind: ArtifactKind) -> Artifact {
        self.replace(kind, Artifact::Empty)
    }

    /// Routes `kind` to a file.
    pub fn enable_file(&mut self, kind: ArtifactKind, path: impl Into<PathBuf>) {
        self.slots[kind.index()] = Artifact::File(path.into());
    }

    /// Requests `kind` in memory.
    pub fn enable_memory(&mut self, kind: ArtifactKind) {
        self.slots[kind.index()] = Artifact::PendingMemory;
    }

    /// Stops requesting `kind`.
    pub fn disable(&mut self, kind: ArtifactKind) {
        self.slots[kind.index()] = Artifact::Empty;
    }

    /// Resets every kind to empty.
    pub fn clear(&mut self) {
        self.slots = Default::default();
    }

    /// Iterates over all kinds and their bindings in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ArtifactKind, &Artifact)> {
        ArtifactKind::ALL.into_iter().zip(self.slots.iter())
    }

    /// Returns `true` if no kind is bound.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Artifact::is_empty)
    }
}
