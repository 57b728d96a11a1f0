//! The compiler backend that runs the compiler executable.

use std::path::Path;

use shc_process::{path_argument, Process};

use crate::compiler::{Compiler, CompilerState};
use crate::error::CompileError;
use crate::staging::{artifact_arguments, StagedArtifacts, StagedSource};
use crate::summary::CompileSummary;

/// Compiles by spawning a DXC-compatible executable once per call.
///
/// Artifact destinations are passed as `-F*` flags; memory requests are
/// pointed at temporary files and read back after the process exits.
#[derive(Debug)]
pub struct ExternalCompiler {
    process: Process,
    state: CompilerState,
}

impl ExternalCompiler {
    /// Creates a backend for the executable at `executable`.
    pub fn new(executable: impl AsRef<Path>) -> Self {
        Self {
            process: Process::new(executable),
            state: CompilerState::default(),
        }
    }

    /// The underlying process, holding the persistent arguments and the raw
    /// output of the last call.
    pub fn process(&self) -> &Process {
        &self.process
    }

    fn run(
        &mut self,
        source: &Path,
        logical_name: Option<&str>,
    ) -> Result<CompileSummary, CompileError> {
        self.state.source_path = Some(source.to_path_buf());
        let staged = StagedArtifacts::stage(&mut self.state.artifacts, self.state.cleanup);

        let configured = self.process.arguments().len();
        self.process
            .add_arguments(artifact_arguments(&self.state.artifacts));
        self.process.add_argument(path_argument(source));
        let arguments = self.process.arguments().to_vec();

        self.process.clear_output();
        let result = self.process.execute();
        self.process.truncate_arguments(configured);

        let exit_code = match result {
            Ok(code) => code,
            Err(e) => {
                staged.restore(&mut self.state.artifacts);
                return Err(e.into());
            }
        };

        let output = String::from_utf8_lossy(self.process.output());
        let summary =
            self.state
                .record_output(exit_code, arguments, &output, source, logical_name);
        staged.reconcile(&mut self.state.artifacts);
        Ok(summary)
    }
}

impl Compiler for ExternalCompiler {
    fn state(&self) -> &CompilerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut CompilerState {
        &mut self.state
    }

    fn add_argument(&mut self, arg: &str) {
        self.process.add_argument(arg);
    }

    fn arguments(&self) -> &[String] {
        self.process.arguments()
    }

    fn compile_from_file(&mut self, path: &Path) -> Result<CompileSummary, CompileError> {
        self.run(path, None)
    }

    fn compile_from_buffer(
        &mut self,
        source: &[u8],
        logical_name: Option<&str>,
    ) -> Result<CompileSummary, CompileError> {
        let logical_name = logical_name.filter(|name| !name.is_empty());
        let staged = StagedSource::write(source, self.state.cleanup)?;
        self.run(staged.path(), logical_name)
    }

    fn reset(&mut self) {
        self.process.clear_arguments();
        self.process.clear_output();
        self.state.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{Artifact, ArtifactKind};
    use crate::staging::StagingCleanup;
    use shc_diagnostics::MessageType;

    #[test]
    fn spawn_failure_restores_memory_requests() {
        let mut compiler = ExternalCompiler::new("/nonexistent/shc-dxc");
        compiler.enable_memory_sink(ArtifactKind::Object);
        compiler.add_argument("-Zi");

        let err = compiler
            .compile_from_file(Path::new("a.hlsl"))
            .unwrap_err();
        assert!(matches!(err, CompileError::Process(_)));
        assert_eq!(compiler.artifact(ArtifactKind::Object), &Artifact::PendingMemory);
        assert_eq!(compiler.arguments(), ["-Zi"]);
    }

    #[cfg(unix)]
    mod scripted {
        use super::*;
        use std::fs;
        use tempfile::TempDir;

        /// Copies the source into `-Fo`, writes `hash` into `-Fsh`, ignores
        /// the other outputs and reports one error and one warning against
        /// the source path.
        const FAKE_DXC: &str = r#"
src=""; object=""; hash=""
while [ $# -gt 0 ]; do
  case "$1" in
    -Fo) shift; object="$1" ;;
    -Fsh) shift; hash="$1" ;;
    -Fc|-Fd|-Fre|-Frs|-T|-E) shift ;;
    *) src="$1" ;;
  esac
  shift
done
if [ -n "$object" ]; then cat "$src" > "$object"; fi
if [ -n "$hash" ]; then printf 'hash' > "$hash"; fi
printf '%s:3:5: error: undeclared identifier\n    ^\n' "$src"
printf '%s:7: warning: implicit truncation\n' "$src" >&2
exit 1
"#;

        const SOURCE: &[u8] = b"float4 main() : SV_Target { return undeclared; }\n";

        /// Runs the fake through `sh` so the script never has to be executable.
        fn fake_compiler(dir: &TempDir) -> ExternalCompiler {
            let script = dir.path().join("fake-dxc.sh");
            fs::write(&script, FAKE_DXC).unwrap();
            let mut compiler = ExternalCompiler::new("sh");
            compiler.add_argument(&script.to_string_lossy());
            compiler
        }

        fn write_source(dir: &TempDir) -> std::path::PathBuf {
            let path = dir.path().join("lit.hlsl");
            fs::write(&path, SOURCE).unwrap();
            path
        }

        #[test]
        fn file_compile_parses_messages() {
            let dir = TempDir::new().unwrap();
            let source = write_source(&dir);
            let mut compiler = fake_compiler(&dir);

            let summary = compiler.compile_from_file(&source).unwrap();
            assert_eq!(summary.exit_code(), Some(1));
            assert_eq!(summary.error_count(), 1);
            assert_eq!(summary.warning_count(), 1);

            let messages = summary.messages();
            assert_eq!(messages.len(), 2);
            let source_text = source.to_string_lossy();
            assert_eq!(messages[0].file_path(), Some(source_text.as_ref()));
            assert_eq!(messages[0].line(), Some(3));
            assert_eq!(messages[0].column(), Some(5));
            assert_eq!(messages[0].message(), Some("undeclared identifier\n    ^"));
            assert_eq!(messages[1].message_type(), MessageType::Warning);
            assert_eq!(messages[1].column(), None);

            assert_eq!(compiler.source_path(), Some(source.as_path()));
            assert_eq!(compiler.messages().len(), 2);
        }

        #[test]
        fn per_call_arguments_do_not_accumulate() {
            let dir = TempDir::new().unwrap();
            let source = write_source(&dir);
            let mut compiler = fake_compiler(&dir);
            compiler.add_arguments(["-T", "ps_6_0"]);
            compiler.enable_memory_sink(ArtifactKind::Object);

            let first = compiler.compile_from_file(&source).unwrap();
            let second = compiler.compile_from_file(&source).unwrap();

            // script, -T, ps_6_0, -Fo, <temp>, <source>
            assert_eq!(first.arguments().len(), 6);
            assert_eq!(second.arguments().len(), 6);
            assert_eq!(first.arguments()[3], "-Fo");
            assert_eq!(first.arguments().last().unwrap(), &source.to_string_lossy());
            assert_eq!(compiler.arguments().len(), 3);
        }

        #[test]
        fn output_of_previous_call_is_not_reparsed() {
            let dir = TempDir::new().unwrap();
            let source = write_source(&dir);
            let mut compiler = fake_compiler(&dir);

            compiler.compile_from_file(&source).unwrap();
            let summary = compiler.compile_from_file(&source).unwrap();
            assert_eq!(summary.messages().len(), 2);
            assert_eq!(summary.error_count(), 1);
        }

        #[test]
        fn memory_sink_round_trip() {
            let dir = TempDir::new().unwrap();
            let source = write_source(&dir);
            let mut compiler = fake_compiler(&dir);
            compiler.enable_memory_sink(ArtifactKind::Object);
            compiler.enable_memory_sink(ArtifactKind::Hash);

            compiler.compile_from_file(&source).unwrap();
            assert_eq!(compiler.artifact(ArtifactKind::Object).bytes(), Some(SOURCE));
            assert_eq!(compiler.artifact(ArtifactKind::Hash).bytes(), Some(&b"hash"[..]));

            // A filled buffer is still a memory request on the next call.
            compiler.compile_from_file(&source).unwrap();
            assert_eq!(compiler.artifact(ArtifactKind::Object).bytes(), Some(SOURCE));
        }

        #[test]
        fn unproduced_memory_output_is_left_empty() {
            let dir = TempDir::new().unwrap();
            let source = write_source(&dir);
            let mut compiler = fake_compiler(&dir);
            compiler.enable_memory_sink(ArtifactKind::DebugInfo);

            let summary = compiler.compile_from_file(&source).unwrap();
            assert_eq!(summary.error_count(), 1);
            assert!(compiler.artifact(ArtifactKind::DebugInfo).is_empty());
        }

        #[test]
        fn file_sink_is_written_by_compiler() {
            let dir = TempDir::new().unwrap();
            let source = write_source(&dir);
            let object = dir.path().join("out.bin");
            let mut compiler = fake_compiler(&dir);
            compiler.enable_file_sink(ArtifactKind::Object, &object);

            compiler.compile_from_file(&source).unwrap();
            assert_eq!(fs::read(&object).unwrap(), SOURCE);
            assert_eq!(
                compiler.artifact(ArtifactKind::Object).file_path(),
                Some(object.as_path())
            );
        }

        #[test]
        fn buffer_compile_uses_logical_name() {
            let dir = TempDir::new().unwrap();
            let mut compiler = fake_compiler(&dir);
            compiler.enable_memory_sink(ArtifactKind::Object);

            let summary = compiler
                .compile_from_buffer(SOURCE, Some("shaders/lit.hlsl"))
                .unwrap();
            for message in summary.messages() {
                assert_eq!(message.file_path(), Some("shaders/lit.hlsl"));
                assert!(!message.full_message().contains("shader-"));
            }
            assert_eq!(compiler.artifact(ArtifactKind::Object).bytes(), Some(SOURCE));

            let staged = compiler.source_path().unwrap().to_path_buf();
            assert!(!staged.exists());
        }

        #[test]
        fn buffer_compile_without_name_reports_staged_path() {
            let dir = TempDir::new().unwrap();
            let mut compiler = fake_compiler(&dir);

            let summary = compiler.compile_from_buffer(SOURCE, None).unwrap();
            let staged = compiler.source_path().unwrap().to_string_lossy().into_owned();
            assert_eq!(summary.messages()[0].file_path(), Some(staged.as_str()));
        }

        #[test]
        fn staged_source_kept_on_request() {
            let dir = TempDir::new().unwrap();
            let mut compiler = fake_compiler(&dir);
            compiler.set_staging_cleanup(StagingCleanup::Keep);

            compiler.compile_from_buffer(SOURCE, Some("lit.hlsl")).unwrap();
            let staged = compiler.source_path().unwrap().to_path_buf();
            assert_eq!(fs::read(&staged).unwrap(), SOURCE);
            fs::remove_file(staged).unwrap();
        }

        #[test]
        fn reset_clears_everything() {
            let dir = TempDir::new().unwrap();
            let source = write_source(&dir);
            let mut compiler = fake_compiler(&dir);
            compiler.enable_memory_sink(ArtifactKind::Object);
            compiler.set_entry_point("main");

            compiler.compile_from_file(&source).unwrap();
            assert!(!compiler.process().output().is_empty());

            compiler.reset();
            assert!(compiler.process().arguments().is_empty());
            assert!(compiler.process().output().is_empty());
            assert!(compiler.messages().is_empty());
            assert_eq!(compiler.entry_point(), None);
            for kind in ArtifactKind::ALL {
                assert!(compiler.artifact(kind).is_empty());
            }
        }
    }
}
