//! Structured records for the diagnostics a shader compiler prints.
//!
//! Compilers in the DXC family print free-form text such as
//! `shader.hlsl:17:25: warning: implicit truncation` followed by indented
//! source excerpts. [`parse_compiler_messages`] splits that text into
//! [`CompilerMessage`] records whose location, [`MessageType`] and body are
//! exposed as views into the original text.

#![warn(missing_docs)]

pub mod message;
pub mod message_type;
pub mod parser;

pub use message::{CompilerMessage, TextSpan};
pub use message_type::MessageType;
pub use parser::parse_compiler_messages;
