//! Rendering compile results for the terminal or as JSON.

use serde::Serialize;
use shc_compiler::{Artifact, ArtifactKind, CompileSummary};
use xxhash_rust::xxh3::xxh3_128;

/// Where one artifact ended up after a compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactReport {
    /// The artifact kind.
    pub kind: ArtifactKind,
    /// The file written, for file sinks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Size in bytes, for memory sinks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    /// XXH3-128 digest as 32 hex digits, for memory sinks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xxh3: Option<String>,
}

impl ArtifactReport {
    /// Describes the binding of `kind`, or `None` if nothing is bound.
    pub fn describe(kind: ArtifactKind, artifact: &Artifact) -> Option<Self> {
        let report = |path: Option<String>, bytes: Option<&[u8]>| ArtifactReport {
            kind,
            path,
            size: bytes.map(<[u8]>::len),
            xxh3: bytes.map(|bytes| format!("{:032x}", xxh3_128(bytes))),
        };
        match artifact {
            Artifact::Empty | Artifact::PendingMemory => None,
            Artifact::File(path) => Some(report(Some(path.display().to_string()), None)),
            Artifact::Memory(bytes) => Some(report(None, Some(bytes))),
        }
    }
}

/// Everything `shc compile --format json` prints.
#[derive(Serialize)]
pub struct CompileReport<'a> {
    /// The compiled source as given on the command line.
    pub source: &'a str,
    /// The compile result.
    #[serde(flatten)]
    pub summary: &'a CompileSummary,
    /// Produced artifacts.
    pub artifacts: &'a [ArtifactReport],
}

/// Renders the human-readable report.
///
/// Messages are always included; the artifact list and result line are
/// omitted when `quiet`.
pub fn render_text(summary: &CompileSummary, artifacts: &[ArtifactReport], quiet: bool) -> String {
    let mut out = String::new();
    for message in summary.messages() {
        out.push_str(&message.to_string());
        out.push('\n');
    }
    if quiet {
        return out;
    }
    for artifact in artifacts {
        match (&artifact.path, artifact.size, &artifact.xxh3) {
            (Some(path), _, _) => {
                out.push_str(&format!("   Wrote {} to {path}\n", artifact.kind));
            }
            (None, Some(size), Some(digest)) => {
                out.push_str(&format!(
                    "   Captured {} ({size} bytes, xxh3 {digest})\n",
                    artifact.kind
                ));
            }
            _ => {}
        }
    }
    let exit = summary
        .exit_code()
        .map_or_else(|| "unknown".to_string(), |code| code.to_string());
    out.push_str(&format!(
        "   Result: {} error(s), {} warning(s), exit code {exit}\n",
        summary.error_count(),
        summary.warning_count()
    ));
    out
}

/// Renders the JSON report.
pub fn render_json(report: &CompileReport<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
