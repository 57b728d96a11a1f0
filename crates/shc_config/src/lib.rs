//! Parsing and validation of `shc.toml` configuration files.
//!
//! The configuration names the compiler to run, the default profile, entry
//! point and extra arguments, where each artifact goes, and what happens to
//! staged temporary files.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
