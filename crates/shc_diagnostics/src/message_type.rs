//! Severity tags attached to parsed compiler messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a compiler message.
///
/// Ordered from least to most severe, with `Unknown` first for messages whose
/// type section could not be recognized.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// No recognized type section.
    #[default]
    Unknown,
    /// Debug output from the compiler.
    Debug,
    /// Informational note.
    Info,
    /// A warning; compilation still produced output.
    Warning,
    /// An error; compilation failed.
    Error,
    /// An unrecoverable compiler failure.
    Critical,
}

impl MessageType {
    /// Matches the text of a message's type section, ignoring ASCII case.
    ///
    /// Compilers only report `warning` and `error` in that position; anything
    /// else maps to [`Unknown`](MessageType::Unknown).
    pub fn from_type_section(text: &str) -> Self {
        if text.eq_ignore_ascii_case("warning") {
            MessageType::Warning
        } else if text.eq_ignore_ascii_case("error") {
            MessageType::Error
        } else {
            MessageType::Unknown
        }
    }

    /// Returns `true` for [`Error`](MessageType::Error) and
    /// [`Critical`](MessageType::Critical).
    pub fn is_error(self) -> bool {
        matches!(self, MessageType::Error | MessageType::Critical)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Unknown => write!(f, "Unknown"),
            MessageType::Debug => write!(f, "Debug"),
            MessageType::Info => write!(f, "Info"),
            MessageType::Warning => write!(f, "Warning"),
            MessageType::Error => write!(f, "Error"),
            MessageType::Critical => write!(f, "Critical"),
        }
    }
}
