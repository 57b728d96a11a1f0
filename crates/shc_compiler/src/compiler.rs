//! The backend-independent compiler facade.

use std::path::{Path, PathBuf};

use shc_diagnostics::{parse_compiler_messages, CompilerMessage};

use crate::artifact::{Artifact, ArtifactKind, ArtifactTable};
use crate::error::CompileError;
use crate::profile::TargetProfile;
use crate::staging::{substitute_source_name, StagingCleanup};
use crate::summary::CompileSummary;

/// Configuration and results shared by every backend.
#[derive(Clone, Debug, Default)]
pub struct CompilerState {
    /// The profile passed with `-T`, if set.
    pub target_profile: Option<TargetProfile>,
    /// The entry point passed with `-E`, if set.
    pub entry_point: Option<String>,
    /// The source of the last compile call.
    pub source_path: Option<PathBuf>,
    /// Messages from the last compile call.
    pub messages: Vec<CompilerMessage>,
    /// Where each artifact kind is routed.
    pub artifacts: ArtifactTable,
    /// What happens to staged temporary files.
    pub cleanup: StagingCleanup,
}

impl CompilerState {
    /// Forgets everything except the cleanup policy.
    pub fn reset(&mut self) {
        self.target_profile = None;
        self.entry_point = None;
        self.source_path = None;
        self.messages.clear();
        self.artifacts.clear();
    }

    /// Parses a call's raw output and records it as the latest result.
    ///
    /// With a logical name, every occurrence of `source` in the output is
    /// replaced by it before parsing.
    pub(crate) fn record_output(
        &mut self,
        exit_code: Option<i32>,
        arguments: Vec<String>,
        output: &str,
        source: &Path,
        logical_name: Option<&str>,
    ) -> CompileSummary {
        let text = match logical_name {
            Some(name) => substitute_source_name(output, source, name),
            None => output.into(),
        };
        let messages = parse_compiler_messages(&text);
        self.messages = messages.clone();
        let summary = CompileSummary::new(exit_code, arguments, messages);
        log::debug!(
            "compiled {}: {} error(s), {} warning(s)",
            logical_name.map_or_else(|| source.display().to_string(), str::to_string),
            summary.error_count(),
            summary.warning_count()
        );
        summary
    }
}

/// A shader compiler backend.
///
/// Configuration calls (`add_argument`, [`set_target_profile`],
/// [`set_entry_point`]) persist across compiles until [`reset`]. Artifact
/// flags and the source path are added per call and never accumulate.
///
/// [`set_target_profile`]: Compiler::set_target_profile
/// [`set_entry_point`]: Compiler::set_entry_point
/// [`reset`]: Compiler::reset
pub trait Compiler {
    /// Shared configuration and results.
    fn state(&self) -> &CompilerState;

    /// Mutable access to the shared configuration and results.
    fn state_mut(&mut self) -> &mut CompilerState;

    /// Appends one argument token to the persistent argument list.
    fn add_argument(&mut self, arg: &str);

    /// The persistent argument list.
    fn arguments(&self) -> &[String];

    /// Compiles the source file at `path`.
    fn compile_from_file(&mut self, path: &Path) -> Result<CompileSummary, CompileError>;

    /// Compiles source held in memory.
    ///
    /// Diagnostics refer to the source by `logical_name` when one is given;
    /// an empty name counts as none.
    fn compile_from_buffer(
        &mut self,
        source: &[u8],
        logical_name: Option<&str>,
    ) -> Result<CompileSummary, CompileError>;

    /// Clears all configuration, results and artifact bindings.
    fn reset(&mut self);

    /// Appends several argument tokens in order.
    fn add_arguments<I, S>(&mut self, args: I)
    where
        Self: Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.add_argument(arg.as_ref());
        }
    }

    /// Sets the target profile and appends `-T <profile>`.
    fn set_target_profile(&mut self, profile: TargetProfile) {
        self.state_mut().target_profile = Some(profile);
        self.add_argument("-T");
        self.add_argument(&profile.to_string());
    }

    /// Sets the entry point and appends `-E <name>`.
    fn set_entry_point(&mut self, entry_point: &str) {
        self.state_mut().entry_point = Some(entry_point.to_string());
        self.add_argument("-E");
        self.add_argument(entry_point);
    }

    /// Chooses what happens to staged temporary files.
    fn set_staging_cleanup(&mut self, cleanup: StagingCleanup) {
        self.state_mut().cleanup = cleanup;
    }

    /// Routes `kind` to a file at `path`.
    fn enable_file_sink(&mut self, kind: ArtifactKind, path: &Path) {
        self.state_mut().artifacts.enable_file(kind, path);
    }

    /// Requests `kind` in memory.
    fn enable_memory_sink(&mut self, kind: ArtifactKind) {
        self.state_mut().artifacts.enable_memory(kind);
    }

    /// Stops producing `kind`.
    fn disable_artifact(&mut self, kind: ArtifactKind) {
        self.state_mut().artifacts.disable(kind);
    }

    /// The current binding of `kind`.
    fn artifact(&self, kind: ArtifactKind) -> &Artifact {
        self.state().artifacts.get(kind)
    }

    /// Takes the produced bytes of a memory artifact, leaving it a pending
    /// memory request.
    fn take_artifact_bytes(&mut self, kind: ArtifactKind) -> Option<Vec<u8>> {
        let artifacts = &mut self.state_mut().artifacts;
        match artifacts.take(kind) {
            Artifact::Memory(bytes) => {
                artifacts.enable_memory(kind);
                Some(bytes)
            }
            other => {
                artifacts.replace(kind, other);
                None
            }
        }
    }

    /// Messages from the last compile call.
    fn messages(&self) -> &[CompilerMessage] {
        &self.state().messages
    }

    /// The source of the last compile call.
    fn source_path(&self) -> Option<&Path> {
        self.state().source_path.as_deref()
    }

    /// The configured target profile.
    fn target_profile(&self) -> Option<TargetProfile> {
        self.state().target_profile
    }

    /// The configured entry point.
    fn entry_point(&self) -> Option<&str> {
        self.state().entry_point.as_deref()
    }
}
