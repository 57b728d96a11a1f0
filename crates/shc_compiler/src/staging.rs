//! Temporary files that carry sources and memory-sink outputs through a call.
//!
//! A compiler executable only reads and writes files, so a source held in
//! memory is written to a uniquely named temporary file first, and every
//! output requested in memory is pointed at a temporary file that is read
//! back once the compiler has exited.

use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shc_process::path_argument;

use crate::artifact::{Artifact, ArtifactKind, ArtifactTable};
use crate::error::CompileError;

/// What happens to staged temporary files once a call has finished.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StagingCleanup {
    /// Delete staged sources and memory-sink intermediates.
    #[default]
    Remove,
    /// Leave them in the temporary directory.
    Keep,
}

/// 128 random bits as 32 hex digits.
fn unique_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}

/// A fresh path in the temporary directory for a staged source.
pub fn staged_source_path() -> PathBuf {
    std::env::temp_dir().join(format!("shader-{}.hlsl", unique_id()))
}

/// A fresh path in the temporary directory for one memory-sink output.
pub fn artifact_temp_path(kind: ArtifactKind) -> PathBuf {
    std::env::temp_dir().join(format!("{}{}.tmp", unique_id(), kind.flag()))
}

/// Replaces every occurrence of the staged source path in `output` with the
/// caller's logical name.
///
/// Matching is exact and case-sensitive, left to right, non-overlapping.
pub fn substitute_source_name<'a>(output: &'a str, staged: &Path, logical_name: &str) -> Cow<'a, str> {
    let staged = staged.to_string_lossy();
    if staged.is_empty() || !output.contains(staged.as_ref()) {
        return Cow::Borrowed(output);
    }
    Cow::Owned(output.replace(staged.as_ref(), logical_name))
}

/// A source written to a temporary file for the duration of one call.
#[derive(Debug)]
pub(crate) struct StagedSource {
    path: PathBuf,
    cleanup: StagingCleanup,
}

impl StagedSource {
    pub(crate) fn write(source: &[u8], cleanup: StagingCleanup) -> Result<Self, CompileError> {
        let path = staged_source_path();
        fs::write(&path, source).map_err(|source| CompileError::Io {
            path: path.clone(),
            source,
        })?;
        log::debug!("staged {} byte source at {}", source.len(), path.display());
        Ok(Self { path, cleanup })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedSource {
    fn drop(&mut self) {
        if self.cleanup == StagingCleanup::Remove {
            remove_staged(&self.path);
        }
    }
}

/// Memory-sink requests temporarily bound to files for one call.
#[derive(Debug)]
pub(crate) struct StagedArtifacts {
    memory: Vec<(ArtifactKind, PathBuf, Artifact)>,
    cleanup: StagingCleanup,
}

impl StagedArtifacts {
    /// Binds every memory request in `table` to a fresh temporary file.
    pub(crate) fn stage(table: &mut ArtifactTable, cleanup: StagingCleanup) -> Self {
        let mut memory = Vec::new();
        for kind in ArtifactKind::ALL {
            if table.get(kind).is_memory_request() {
                let temp = artifact_temp_path(kind);
                let previous = table.replace(kind, Artifact::File(temp.clone()));
                memory.push((kind, temp, previous));
            }
        }
        Self { memory, cleanup }
    }

    /// Reads every staged output back into memory.
    ///
    /// An output that cannot be read leaves its kind empty.
    pub(crate) fn reconcile(self, table: &mut ArtifactTable) {
        for (kind, temp, _) in &self.memory {
            let artifact = match fs::read(temp) {
                Ok(bytes) => Artifact::Memory(bytes),
                Err(e) => {
                    log::warn!("no {kind} output at {}: {e}", temp.display());
                    Artifact::Empty
                }
            };
            table.replace(*kind, artifact);
            if self.cleanup == StagingCleanup::Remove {
                remove_staged(temp);
            }
        }
    }

    /// Puts the original memory requests back after a failed call.
    pub(crate) fn restore(self, table: &mut ArtifactTable) {
        for (kind, temp, previous) in self.memory {
            table.replace(kind, previous);
            if self.cleanup == StagingCleanup::Remove {
                remove_staged(&temp);
            }
        }
    }
}

/// The flag and path tokens for every bound artifact, in kind order.
pub(crate) fn artifact_arguments(table: &ArtifactTable) -> Vec<String> {
    table
        .iter()
        .filter_map(|(kind, artifact)| artifact.file_path().map(|path| (kind, path)))
        .flat_map(|(kind, path)| [kind.flag().to_string(), path_argument(path)])
        .collect()
}

fn remove_staged(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => log::debug!("removed {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => log::warn!("failed to remove {}: {e}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_paths_are_unique() {
        let a = staged_source_path();
        let b = staged_source_path();
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(std::env::temp_dir().as_path()));
        let name = a.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("shader-"));
        assert!(name.ends_with(".hlsl"));
        assert_eq!(name.len(), "shader-".len() + 32 + ".hlsl".len());
    }

    #[test]
    fn artifact_temp_path_carries_flag() {
        let path = artifact_temp_path(ArtifactKind::Hash);
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("-Fsh.tmp"));
        assert_ne!(path, artifact_temp_path(ArtifactKind::Hash));
    }

    #[test]
    fn substitution_replaces_every_occurrence() {
        let staged = Path::new("/tmp/shader-ab.hlsl");
        let output = "/tmp/shader-ab.hlsl:1:1: error: x\n/tmp/shader-ab.hlsl:2:1: note: y\n";
        let rewritten = substitute_source_name(output, staged, "lit.hlsl");
        assert_eq!(rewritten, "lit.hlsl:1:1: error: x\nlit.hlsl:2:1: note: y\n");
        assert!(!rewritten.contains("/tmp/shader-ab.hlsl"));
    }

    #[test]
    fn substitution_is_case_sensitive() {
        let staged = Path::new("/tmp/Shader.hlsl");
        let output = "/tmp/shader.hlsl: error: x";
        assert!(matches!(
            substitute_source_name(output, staged, "lit.hlsl"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn staged_source_is_removed_on_drop() {
        let staged = StagedSource::write(b"float4 main() : SV_Target { return 0; }", StagingCleanup::Remove)
            .unwrap();
        let path = staged.path().to_path_buf();
        assert_eq!(fs::read(&path).unwrap(), b"float4 main() : SV_Target { return 0; }");
        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn staged_source_is_kept_on_request() {
        let staged = StagedSource::write(b"x", StagingCleanup::Keep).unwrap();
        let path = staged.path().to_path_buf();
        drop(staged);
        assert!(path.exists());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn stage_binds_memory_requests_to_files() {
        let mut table = ArtifactTable::new();
        table.enable_file(ArtifactKind::Object, "out.bin");
        table.enable_memory(ArtifactKind::Hash);
        table.replace(ArtifactKind::Reflection, Artifact::Memory(vec![9]));

        let staged = StagedArtifacts::stage(&mut table, StagingCleanup::Remove);
        assert_eq!(staged.memory.len(), 2);
        assert!(table.get(ArtifactKind::Hash).file_path().is_some());
        assert!(table.get(ArtifactKind::Reflection).file_path().is_some());

        let args = artifact_arguments(&table);
        assert_eq!(args.len(), 6);
        assert_eq!(args[0], "-Fo");
        assert_eq!(args[1], "out.bin");
        assert_eq!(args[2], "-Fre");
        assert_eq!(args[4], "-Fsh");

        staged.restore(&mut table);
        assert_eq!(table.get(ArtifactKind::Hash), &Artifact::PendingMemory);
        assert_eq!(table.get(ArtifactKind::Reflection), &Artifact::Memory(vec![9]));
    }

    #[test]
    fn reconcile_reads_back_and_removes() {
        let mut table = ArtifactTable::new();
        table.enable_memory(ArtifactKind::Object);
        table.enable_memory(ArtifactKind::DebugInfo);
        let staged = StagedArtifacts::stage(&mut table, StagingCleanup::Remove);

        let object_path = table.get(ArtifactKind::Object).file_path().unwrap().to_path_buf();
        fs::write(&object_path, [0xDE, 0xAD, 0xBE, 0xEF]).unwrap();

        staged.reconcile(&mut table);
        assert_eq!(
            table.get(ArtifactKind::Object),
            &Artifact::Memory(vec![0xDE, 0xAD, 0xBE, 0xEF])
        );
        // Never written by the compiler.
        assert!(table.get(ArtifactKind::DebugInfo).is_empty());
        assert!(!object_path.exists());
    }

    #[test]
    fn cleanup_serde() {
        #[derive(Deserialize)]
        struct Wrapper {
            cleanup: StagingCleanup,
        }
        let w: Wrapper = serde_json::from_str(r#"{"cleanup":"keep"}"#).unwrap();
        assert_eq!(w.cleanup, StagingCleanup::Keep);
        assert_eq!(StagingCleanup::default(), StagingCleanup::Remove);
    }
}
