//! Single-child process orchestration for driving an external compiler.
//!
//! A [`Process`] spawns one child with stdout and stderr merged into a single
//! pipe, drains that pipe while waiting for the child to exit, and keeps the
//! captured bytes so the caller can parse them afterwards.

#![warn(missing_docs)]

pub mod error;
pub mod process;

pub use error::ProcessError;
pub use process::{path_argument, Process};
