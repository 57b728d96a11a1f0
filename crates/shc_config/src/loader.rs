//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{ArtifactSink, ShcConfig};
use std::path::Path;

/// The configuration file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "shc.toml";

/// Loads and validates `<dir>/shc.toml`.
///
/// Relative paths in the file are resolved against `dir`.
pub fn load_config(dir: &Path) -> Result<ShcConfig, ConfigError> {
    load_config_file(&dir.join(CONFIG_FILE_NAME))
}

/// Loads and validates the configuration file at `path`.
///
/// Relative paths in the file are resolved against the file's directory.
pub fn load_config_file(path: &Path) -> Result<ShcConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = parse_config(&content, &path.display().to_string())?;
    if let Some(dir) = path.parent() {
        config.resolve_paths(dir);
    }
    Ok(config)
}

/// Parses and validates an `shc.toml` configuration from a string.
///
/// Paths are left as written.
pub fn load_config_from_str(content: &str) -> Result<ShcConfig, ConfigError> {
    parse_config(content, CONFIG_FILE_NAME)
}

fn parse_config(content: &str, origin: &str) -> Result<ShcConfig, ConfigError> {
    let config: ShcConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
        origin: origin.to_string(),
        message: e.message().to_string(),
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks that configured values are usable and consistent.
fn validate_config(config: &ShcConfig) -> Result<(), ConfigError> {
    let empty = |key: &str| ConfigError::EmptyValue {
        key: key.to_string(),
    };
    if config.compiler.path.is_some() && config.compiler.toolchain_dir.is_some() {
        return Err(ConfigError::ConflictingCompiler);
    }
    if config.shader.entry.as_deref() == Some("") {
        return Err(empty("shader.entry"));
    }
    if let Some(i) = config.shader.args.iter().position(String::is_empty) {
        return Err(empty(&format!("shader.args[{i}]")));
    }
    for (kind, sink) in config.artifacts.iter() {
        if let ArtifactSink::File(path) = sink {
            if path.as_os_str().is_empty() {
                return Err(empty(&format!("artifacts.{kind}")));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Backend;
    use shc_compiler::{ArtifactKind, ShaderStage, StagingCleanup, TargetProfile};
    use std::path::PathBuf;

    #[test]
    fn parse_empty_config() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.compiler.backend, Backend::External);
        assert!(config.compiler.path.is_none());
        assert!(config.shader.profile.is_none());
        assert!(config.shader.args.is_empty());
        assert_eq!(config.artifacts.iter().count(), 0);
        assert_eq!(config.staging.cleanup, StagingCleanup::Remove);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[compiler]
backend = "external"
path = "tools/dxc/bin/dxc"

[shader]
profile = "vs_6_7"
entry = "main"
args = ["-Zi", "-Qembed_debug"]

[artifacts]
object = "out/shader.bin"
hash = "memory"

[staging]
cleanup = "keep"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.compiler.path, Some(PathBuf::from("tools/dxc/bin/dxc")));
        assert_eq!(
            config.shader.profile,
            TargetProfile::new(ShaderStage::Vertex, 7)
        );
        assert_eq!(config.shader.entry.as_deref(), Some("main"));
        assert_eq!(config.shader.args, vec!["-Zi", "-Qembed_debug"]);
        assert_eq!(
            config.artifacts.get(ArtifactKind::Object),
            Some(&ArtifactSink::File(PathBuf::from("out/shader.bin")))
        );
        assert_eq!(config.artifacts.get(ArtifactKind::Hash), Some(&ArtifactSink::Memory));
        assert_eq!(config.staging.cleanup, StagingCleanup::Keep);
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unknown_profile_errors() {
        let err = load_config_from_str("[shader]\nprofile = \"vs_5_0\"\n").unwrap_err();
        match err {
            ConfigError::Parse { origin, message } => {
                assert_eq!(origin, CONFIG_FILE_NAME);
                assert!(message.contains("vs_5_0"));
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn unknown_artifact_kind_errors() {
        let err = load_config_from_str("[artifacts]\npdb = \"out.pdb\"\n").unwrap_err();
        match err {
            ConfigError::Parse { message, .. } => assert!(message.contains("pdb")),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn path_and_toolchain_dir_conflict() {
        let toml = r#"
[compiler]
path = "dxc"
toolchain_dir = "tools"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingCompiler));
    }

    #[test]
    fn empty_entry_errors() {
        let err = load_config_from_str("[shader]\nentry = \"\"\n").unwrap_err();
        assert_eq!(err.to_string(), "shader.entry is empty");
    }

    #[test]
    fn empty_argument_errors() {
        let err = load_config_from_str("[shader]\nargs = [\"-Zi\", \"\"]\n").unwrap_err();
        assert_eq!(err.to_string(), "shader.args[1] is empty");
    }

    #[test]
    fn empty_artifact_path_errors() {
        let err = load_config_from_str("[artifacts]\nobject = \"\"\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "artifacts.object is empty"
        );
    }

    #[test]
    fn load_from_directory_resolves_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[compiler]\ntoolchain_dir = \"tools\"\n\n[artifacts]\nobject = \"out/a.bin\"\n",
        )
        .unwrap();

        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.compiler.toolchain_dir, Some(dir.path().join("tools")));
        assert_eq!(
            config.artifacts.get(ArtifactKind::Object),
            Some(&ArtifactSink::File(dir.path().join("out/a.bin")))
        );
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_config(dir.path()).unwrap_err();
        match err {
            ConfigError::Read { path, .. } => assert_eq!(path, dir.path().join(CONFIG_FILE_NAME)),
            other => panic!("expected Read, got {other:?}"),
        }
    }

    #[test]
    fn parse_error_names_the_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[shader]\nprofile = \"zz_6_0\"\n").unwrap();
        let err = load_config_file(&path).unwrap_err();
        assert!(err.to_string().starts_with(&path.display().to_string()));
        assert!(err.to_string().contains("zz_6_0"));
    }
}
