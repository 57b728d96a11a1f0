//! Driving a DXC-family shader compiler and collecting what it produces.
//!
//! The [`Compiler`] trait is the facade callers program against. Two
//! backends implement it: [`ExternalCompiler`] spawns the compiler executable
//! through [`shc_process`], [`LibraryCompiler`] calls into an in-process
//! library through the [`native`] traits. Both turn the compiler's text output
//! into [`CompilerMessage`](shc_diagnostics::CompilerMessage) records and route
//! secondary outputs (object code, PDB, disassembly, reflection, root
//! signature, hash) into the destinations configured in the
//! [`ArtifactTable`].

#![warn(missing_docs)]

pub mod artifact;
pub mod compiler;
pub mod error;
pub mod external;
pub mod native;
pub mod profile;
pub mod staging;
pub mod summary;

pub use artifact::{Artifact, ArtifactKind, ArtifactTable};
pub use compiler::{Compiler, CompilerState};
pub use error::{CompileError, NativeError};
pub use external::ExternalCompiler;
pub use native::LibraryCompiler;
pub use profile::{ShaderStage, TargetProfile};
pub use staging::StagingCleanup;
pub use summary::CompileSummary;
