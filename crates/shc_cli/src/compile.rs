//! The `shc compile` command.

use std::error::Error;
use std::fs;
use std::path::Path;

use shc_compiler::{ArtifactKind, CompileSummary, Compiler, ExternalCompiler, StagingCleanup};
use shc_config::{ArtifactSink, Backend, ShcConfig};

use crate::report::{render_json, render_text, ArtifactReport, CompileReport};
use crate::settings::{load_settings, merged_artifacts, parse_profile, resolve_executable};
use crate::{CompileArgs, GlobalArgs, ReportFormat};

/// Compiles one shader and prints its messages and summary.
///
/// Exits with 1 unless the compiler exited with 0 and reported no errors.
pub fn run(args: &CompileArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let config = load_settings(global)?;
    let (summary, artifacts) = compile(&config, args, global)?;

    match args.format {
        ReportFormat::Text => eprint!("{}", render_text(&summary, &artifacts, global.quiet)),
        ReportFormat::Json => {
            let report = CompileReport {
                source: &args.file,
                summary: &summary,
                artifacts: &artifacts,
            };
            println!("{}", render_json(&report)?);
        }
    }

    Ok(exit_code(&summary))
}

fn exit_code(summary: &CompileSummary) -> i32 {
    if summary.succeeded() {
        0
    } else {
        1
    }
}

/// Runs the compile described by `config` and the command line.
fn compile(
    config: &ShcConfig,
    args: &CompileArgs,
    global: &GlobalArgs,
) -> Result<(CompileSummary, Vec<ArtifactReport>), Box<dyn Error>> {
    if config.compiler.backend == Backend::Library {
        return Err("the library backend cannot be driven from the command line; \
                    set compiler.backend = \"external\""
            .into());
    }

    let executable = resolve_executable(&config.compiler)?;
    log::debug!("compiler executable: {}", executable.display());
    let mut compiler = ExternalCompiler::new(&executable);

    compiler.add_arguments(&config.shader.args);
    compiler.add_arguments(&args.extra);

    let profile = match &args.profile {
        Some(text) => Some(parse_profile(text)?),
        None => config.shader.profile,
    };
    if let Some(profile) = profile {
        compiler.set_target_profile(profile);
    }
    if let Some(entry) = args.entry.as_deref().or(config.shader.entry.as_deref()) {
        compiler.set_entry_point(entry);
    }

    compiler.set_staging_cleanup(if args.keep_temps {
        StagingCleanup::Keep
    } else {
        config.staging.cleanup
    });

    for (kind, sink) in merged_artifacts(config, &args.artifacts)? {
        match sink {
            ArtifactSink::Memory => compiler.enable_memory_sink(kind),
            ArtifactSink::File(path) => compiler.enable_file_sink(kind, &path),
        }
    }

    let source = Path::new(&args.file);
    let summary = match args.name.as_deref() {
        Some(name) => {
            let text = fs::read(source)
                .map_err(|e| format!("failed to read `{}`: {e}", source.display()))?;
            compiler.compile_from_buffer(&text, Some(name))?
        }
        None => compiler.compile_from_file(source)?,
    };

    if global.verbose && !global.quiet {
        eprintln!(
            "   Running {} {}",
            executable.display(),
            summary.arguments().join(" ")
        );
    }

    let artifacts = ArtifactKind::ALL
        .into_iter()
        .filter_map(|kind| ArtifactReport::describe(kind, compiler.artifact(kind)))
        .collect();

    Ok((summary, artifacts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use shc_config::load_config_from_str;

    fn global() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
        }
    }

    #[test]
    fn library_backend_is_rejected() {
        let config = load_config_from_str("[compiler]\nbackend = \"library\"\n").unwrap();
        let args = CompileArgs::parse_from(["compile", "lit.hlsl"]);
        let err = compile(&config, &args, &global()).unwrap_err();
        assert!(err.to_string().contains("library backend"));
    }

    #[test]
    fn bad_profile_is_rejected_before_spawning() {
        let config = load_config_from_str("[compiler]\npath = \"/nonexistent/dxc\"\n").unwrap();
        let args = CompileArgs::parse_from(["compile", "lit.hlsl", "-T", "xs_6_0"]);
        let err = compile(&config, &args, &global()).unwrap_err();
        assert_eq!(err.to_string(), "unsupported target profile `xs_6_0`");
    }

    #[test]
    fn missing_compiler_is_an_error() {
        let config = load_config_from_str("[compiler]\npath = \"/nonexistent/dxc\"\n").unwrap();
        let args = CompileArgs::parse_from(["compile", "lit.hlsl"]);
        let err = compile(&config, &args, &global()).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dxc"));
    }

    #[test]
    fn exit_code_follows_errors() {
        let clean = CompileSummary::new(Some(0), Vec::new(), Vec::new());
        assert_eq!(exit_code(&clean), 0);
        let failed = CompileSummary::new(
            Some(0),
            Vec::new(),
            shc_diagnostics::parse_compiler_messages("a.hlsl:1:1: error: boom\n"),
        );
        assert_eq!(exit_code(&failed), 1);
    }

    #[test]
    fn silent_compiler_failure_is_not_success() {
        let killed = CompileSummary::new(None, Vec::new(), Vec::new());
        assert_eq!(exit_code(&killed), 1);
        let failed = CompileSummary::new(Some(3), Vec::new(), Vec::new());
        assert_eq!(exit_code(&failed), 1);
        let warned = CompileSummary::new(
            Some(0),
            Vec::new(),
            shc_diagnostics::parse_compiler_messages("a.hlsl:1: warning: w\n"),
        );
        assert_eq!(exit_code(&warned), 0);
    }

    #[cfg(unix)]
    mod scripted {
        use super::*;
        use std::path::PathBuf;
        use tempfile::TempDir;

        /// Writes `-Fo` as a copy of the source, `hash` into `-Fsh`, and
        /// reports one warning, or an error when `-E broken` is passed.
        const FAKE_DXC: &str = r#"
src=""; object=""; hash=""; entry=""
while [ $# -gt 0 ]; do
  case "$1" in
    -Fo) shift; object="$1" ;;
    -Fsh) shift; hash="$1" ;;
    -E) shift; entry="$1" ;;
    -Fc|-Fd|-Fre|-Frs|-T) shift ;;
    -*) ;;
    *) src="$1" ;;
  esac
  shift
done
if [ -n "$object" ]; then cat "$src" > "$object"; fi
if [ -n "$hash" ]; then printf 'hash' > "$hash"; fi
if [ "$entry" = "broken" ]; then
  printf '%s:2:1: error: unknown entry point\n' "$src" >&2
  exit 1
fi
printf '%s:4: warning: implicit truncation\n' "$src"
exit 0
"#;

        struct Fixture {
            dir: TempDir,
            config: ShcConfig,
            source: PathBuf,
        }

        fn fixture() -> Fixture {
            let dir = TempDir::new().unwrap();
            let script = dir.path().join("fake-dxc.sh");
            fs::write(&script, FAKE_DXC).unwrap();
            let source = dir.path().join("lit.hlsl");
            fs::write(&source, "float4 main() : SV_Target { return 1; }\n").unwrap();
            let config = load_config_from_str(&format!(
                "[compiler]\npath = \"sh\"\n\n[shader]\nprofile = \"ps_6_0\"\nentry = \"main\"\nargs = ['{}']\n",
                script.display()
            ))
            .unwrap();
            Fixture {
                dir,
                config,
                source,
            }
        }

        #[test]
        fn compile_with_artifacts() {
            let fx = fixture();
            let object = fx.dir.path().join("lit.dxil");
            let object_spec = format!("object={}", object.display());
            let source = fx.source.to_string_lossy().into_owned();
            let args = CompileArgs::parse_from([
                "compile",
                source.as_str(),
                "--artifact",
                object_spec.as_str(),
                "--artifact",
                "hash=memory",
            ]);

            let (summary, artifacts) = compile(&fx.config, &args, &global()).unwrap();
            assert_eq!(summary.exit_code(), Some(0));
            assert_eq!(summary.warning_count(), 1);
            assert_eq!(exit_code(&summary), 0);
            assert_eq!(summary.messages()[0].file_path(), Some(source.as_str()));

            assert_eq!(artifacts.len(), 2);
            assert_eq!(artifacts[0].kind, ArtifactKind::Object);
            let object_text = object.to_string_lossy().into_owned();
            assert_eq!(artifacts[0].path.as_deref(), Some(object_text.as_str()));
            assert_eq!(artifacts[1].kind, ArtifactKind::Hash);
            assert_eq!(artifacts[1].size, Some(4));
            assert_eq!(
                fs::read(&object).unwrap(),
                fs::read(&fx.source).unwrap()
            );
        }

        #[test]
        fn command_line_entry_overrides_config() {
            let fx = fixture();
            let source = fx.source.to_string_lossy().into_owned();
            let args = CompileArgs::parse_from(["compile", source.as_str(), "-E", "broken"]);

            let (summary, artifacts) = compile(&fx.config, &args, &global()).unwrap();
            assert_eq!(summary.exit_code(), Some(1));
            assert_eq!(summary.error_count(), 1);
            assert_eq!(exit_code(&summary), 1);
            assert!(artifacts.is_empty());
            let arguments = summary.arguments();
            assert!(arguments.windows(2).any(|w| w == ["-E", "broken"]));
            assert!(arguments.windows(2).any(|w| w == ["-T", "ps_6_0"]));
        }

        #[test]
        fn logical_name_replaces_staged_path() {
            let fx = fixture();
            let source = fx.source.to_string_lossy().into_owned();
            let args = CompileArgs::parse_from([
                "compile",
                source.as_str(),
                "--name",
                "shaders/lit.hlsl",
            ]);

            let (summary, _) = compile(&fx.config, &args, &global()).unwrap();
            assert_eq!(summary.messages().len(), 1);
            assert_eq!(summary.messages()[0].file_path(), Some("shaders/lit.hlsl"));
            assert_eq!(summary.messages()[0].line(), Some(4));
        }

        #[test]
        fn missing_source_with_name() {
            let fx = fixture();
            let missing = fx.dir.path().join("missing.hlsl");
            let missing = missing.to_string_lossy().into_owned();
            let args = CompileArgs::parse_from(["compile", missing.as_str(), "--name", "m.hlsl"]);
            let err = compile(&fx.config, &args, &global()).unwrap_err();
            assert!(err.to_string().starts_with("failed to read"));
        }
    }
}
