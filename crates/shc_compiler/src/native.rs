//! The in-process compiler backend and the library interface it drives.
//!
//! A binding to a DXC-compatible library implements [`NativeLibrary`];
//! [`LibraryCompiler`] puts the facade on top of it. Outputs are requested
//! by [`NativeOutputKind`] rather than by command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use crate::artifact::{Artifact, ArtifactKind};
use crate::compiler::{Compiler, CompilerState};
use crate::error::{CompileError, NativeError};
use crate::staging::staged_source_path;
use crate::summary::CompileSummary;

/// Output kinds a compile result can hold, numbered like `DXC_OUT_KIND`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u32)]
pub enum NativeOutputKind {
    /// `DXC_OUT_OBJECT`
    Object = 1,
    /// `DXC_OUT_ERRORS`
    Errors = 2,
    /// `DXC_OUT_PDB`
    Pdb = 3,
    /// `DXC_OUT_SHADER_HASH`
    ShaderHash = 4,
    /// `DXC_OUT_DISASSEMBLY`
    Disassembly = 5,
    /// `DXC_OUT_REFLECTION`
    Reflection = 8,
    /// `DXC_OUT_ROOT_SIGNATURE`
    RootSignature = 9,
}

impl NativeOutputKind {
    /// The native output holding `kind`.
    pub fn for_artifact(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::AssemblyListing => NativeOutputKind::Disassembly,
            ArtifactKind::DebugInfo => NativeOutputKind::Pdb,
            ArtifactKind::Object => NativeOutputKind::Object,
            ArtifactKind::Reflection => NativeOutputKind::Reflection,
            ArtifactKind::RootSignature => NativeOutputKind::RootSignature,
            ArtifactKind::Hash => NativeOutputKind::ShaderHash,
        }
    }
}

/// One output blob from a compile result.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NativeOutput {
    /// The name the library attached to the output, if any.
    pub name: Option<String>,
    /// The output bytes.
    pub data: Vec<u8>,
}

/// Resolves `#include` directives during an in-process compile.
pub trait IncludeHandler {
    /// Loads `include` as requested from the file `includer`.
    fn load(&self, include: &str, includer: &Path) -> Option<Vec<u8>>;
}

/// Looks for includes next to the including file, then in each include
/// directory in order.
#[derive(Clone, Debug, Default)]
pub struct FileSystemIncludeHandler {
    include_dirs: Vec<PathBuf>,
}

impl FileSystemIncludeHandler {
    /// Creates a handler searching the given directories.
    pub fn new(include_dirs: Vec<PathBuf>) -> Self {
        Self { include_dirs }
    }

    /// The directories searched after the including file's directory.
    pub fn include_dirs(&self) -> &[PathBuf] {
        &self.include_dirs
    }
}

impl IncludeHandler for FileSystemIncludeHandler {
    fn load(&self, include: &str, includer: &Path) -> Option<Vec<u8>> {
        let local = includer.parent().map(|dir| dir.join(include));
        local
            .into_iter()
            .chain(self.include_dirs.iter().map(|dir| dir.join(include)))
            .find_map(|candidate| fs::read(candidate).ok())
    }
}

/// The result of one in-process compile.
pub trait NativeResult {
    /// The compile status; zero on success.
    fn status(&self) -> i32;

    /// The diagnostic text, if any was produced.
    fn errors(&self) -> Option<String>;

    /// The output of the given kind, if produced.
    fn output(&self, kind: NativeOutputKind) -> Option<NativeOutput>;
}

/// A compiler instance created by a [`NativeLibrary`].
pub trait NativeCompiler {
    /// Compiles `source` with the given argument tokens.
    fn compile(
        &mut self,
        source: &[u8],
        arguments: &[String],
        include_handler: &dyn IncludeHandler,
    ) -> Result<Box<dyn NativeResult>, NativeError>;
}

/// A loaded compiler library.
pub trait NativeLibrary {
    /// Creates a compiler instance.
    fn create_compiler(&self) -> Result<Box<dyn NativeCompiler>, NativeError>;

    /// Reads a source file the way the library would.
    fn load_file(&self, path: &Path) -> Result<Vec<u8>, NativeError>;

    /// Creates the include handler used for every compile.
    fn create_include_handler(
        &self,
        include_dirs: &[PathBuf],
    ) -> Result<Box<dyn IncludeHandler>, NativeError> {
        Ok(Box::new(FileSystemIncludeHandler::new(include_dirs.to_vec())))
    }
}

/// Compiles in-process through a [`NativeLibrary`].
pub struct LibraryCompiler<L: NativeLibrary> {
    library: L,
    compiler: Box<dyn NativeCompiler>,
    include_dirs: Vec<PathBuf>,
    arguments: Vec<String>,
    state: CompilerState,
}

impl<L: NativeLibrary> LibraryCompiler<L> {
    /// Creates a backend with a fresh compiler instance from `library`.
    pub fn new(library: L) -> Result<Self, CompileError> {
        let compiler = library
            .create_compiler()
            .map_err(CompileError::StateNotRecoverable)?;
        Ok(Self {
            library,
            compiler,
            include_dirs: Vec::new(),
            arguments: Vec::new(),
            state: CompilerState::default(),
        })
    }

    /// The library this backend drives.
    pub fn library(&self) -> &L {
        &self.library
    }

    /// Adds a directory searched for includes.
    pub fn add_include_dir(&mut self, dir: impl Into<PathBuf>) {
        self.include_dirs.push(dir.into());
    }

    fn run(&mut self, source: &[u8], source_name: &Path) -> Result<CompileSummary, CompileError> {
        self.state.source_path = Some(source_name.to_path_buf());

        let mut arguments = self.arguments.clone();
        arguments.push(source_name.to_string_lossy().into_owned());

        let include_handler = self
            .library
            .create_include_handler(&self.include_dirs)
            .map_err(CompileError::StateNotRecoverable)?;
        let result = self
            .compiler
            .compile(source, &arguments, include_handler.as_ref())
            .map_err(CompileError::StateNotRecoverable)?;

        self.collect_artifacts(result.as_ref());

        let errors = result.errors().unwrap_or_default();
        Ok(self
            .state
            .record_output(Some(result.status()), arguments, &errors, source_name, None))
    }

    fn collect_artifacts(&mut self, result: &dyn NativeResult) {
        for kind in ArtifactKind::ALL {
            let artifacts = &mut self.state.artifacts;
            let artifact = artifacts.get(kind);
            if artifact.is_empty() {
                continue;
            }
            let output = result.output(NativeOutputKind::for_artifact(kind));
            if artifact.is_memory_request() {
                let filled = match output {
                    Some(output) => Artifact::Memory(output.data),
                    None => {
                        log::warn!("compiler produced no {kind} output");
                        Artifact::Empty
                    }
                };
                artifacts.replace(kind, filled);
            } else if let (Some(path), Some(output)) = (artifact.file_path(), output) {
                if let Err(e) = fs::write(path, &output.data) {
                    log::warn!("failed to write {kind} output to {}: {e}", path.display());
                }
            }
        }
    }
}

impl<L: NativeLibrary> Compiler for LibraryCompiler<L> {
    fn state(&self) -> &CompilerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut CompilerState {
        &mut self.state
    }

    fn add_argument(&mut self, arg: &str) {
        self.arguments.push(arg.to_string());
    }

    fn arguments(&self) -> &[String] {
        &self.arguments
    }

    fn compile_from_file(&mut self, path: &Path) -> Result<CompileSummary, CompileError> {
        let source = self.library.load_file(path).map_err(|e| {
            log::debug!("loading {} failed: {e}", path.display());
            CompileError::NoSuchFile {
                path: path.to_path_buf(),
            }
        })?;
        self.run(&source, path)
    }

    /// The source never touches the disk; the logical name, or a generated
    /// temporary-style name, is passed as the source file name.
    fn compile_from_buffer(
        &mut self,
        source: &[u8],
        logical_name: Option<&str>,
    ) -> Result<CompileSummary, CompileError> {
        let name = match logical_name.filter(|name| !name.is_empty()) {
            Some(name) => PathBuf::from(name),
            None => staged_source_path(),
        };
        self.run(source, &name)
    }

    fn reset(&mut self) {
        self.arguments.clear();
        self.state.reset();
    }
}
