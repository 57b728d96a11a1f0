//! Compiler message records and the byte spans that locate their fields.

use crate::message_type::MessageType;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::Range;

/// A byte range inside a message's full text, as offset and length.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TextSpan {
    /// Byte offset of the first byte of the span.
    pub offset: usize,
    /// Length of the span in bytes.
    pub len: usize,
}

impl TextSpan {
    /// Creates a span from an offset and a length.
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Creates a span covering `start..end`.
    pub fn from_range(range: Range<usize>) -> Self {
        Self {
            offset: range.start,
            len: range.end - range.start,
        }
    }

    /// Returns the byte range covered by this span.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }

    /// Returns `true` if the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// One diagnostic block reported by a compiler.
///
/// The verbatim text is always kept. Location, type and body are optional and
/// only present when the parser recognized them; the textual fields are spans
/// into [`full_message`](Self::full_message) rather than copies.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CompilerMessage {
    full_message: String,
    file_path: Option<TextSpan>,
    line: Option<u32>,
    column: Option<u32>,
    message: Option<TextSpan>,
    message_type: MessageType,
}

impl CompilerMessage {
    /// A message with no recognized fields.
    pub(crate) fn unstructured(full_message: impl Into<String>) -> Self {
        Self {
            full_message: full_message.into(),
            file_path: None,
            line: None,
            column: None,
            message: None,
            message_type: MessageType::Unknown,
        }
    }

    pub(crate) fn set_location(&mut self, location: Location) {
        debug_assert!(location.file_path.range().end <= self.full_message.len());
        self.file_path = Some(location.file_path);
        self.line = Some(location.line);
        self.column = location.column;
    }

    pub(crate) fn set_message_type(&mut self, message_type: MessageType) {
        self.message_type = message_type;
    }

    pub(crate) fn set_message(&mut self, span: TextSpan) {
        debug_assert!(span.range().end <= self.full_message.len());
        self.message = Some(span);
    }

    /// The verbatim text of the block, trailing newlines trimmed.
    pub fn full_message(&self) -> &str {
        &self.full_message
    }

    /// The source file the message refers to.
    pub fn file_path(&self) -> Option<&str> {
        self.file_path.map(|span| &self.full_message[span.range()])
    }

    /// The span of [`file_path`](Self::file_path) inside the full text.
    pub fn file_path_span(&self) -> Option<TextSpan> {
        self.file_path
    }

    /// The 1-based source line.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// The 1-based source column.
    pub fn column(&self) -> Option<u32> {
        self.column
    }

    /// The message body, including any indented continuation lines.
    pub fn message(&self) -> Option<&str> {
        self.message.map(|span| &self.full_message[span.range()])
    }

    /// The span of [`message`](Self::message) inside the full text.
    pub fn message_span(&self) -> Option<TextSpan> {
        self.message
    }

    /// The recognized message type.
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Returns `true` if the message is an error.
    pub fn is_error(&self) -> bool {
        self.message_type.is_error()
    }

    /// Returns `true` if the message is a warning.
    pub fn is_warning(&self) -> bool {
        self.message_type == MessageType::Warning
    }
}

/// The `<path>:<line>[:<column>]` prefix of a message.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct Location {
    pub file_path: TextSpan,
    pub line: u32,
    pub column: Option<u32>,
}

impl fmt::Display for CompilerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;
        if let Some(path) = self.file_path() {
            f.write_str(path)?;
            wrote = true;
        }
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
            wrote = true;
        }
        if let Some(column) = self.column {
            write!(f, ":{column}")?;
            wrote = true;
        }
        if self.message_type != MessageType::Unknown {
            if wrote {
                f.write_str(": ")?;
            }
            write!(f, "{}", self.message_type)?;
            wrote = true;
        }
        if let Some(message) = self.message() {
            if wrote {
                f.write_str(": ")?;
            }
            f.write_str(message)?;
            wrote = true;
        }
        if !wrote {
            f.write_str(&self.full_message)?;
        }
        Ok(())
    }
}

impl Serialize for CompilerMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CompilerMessage", 6)?;
        state.serialize_field("type", &self.message_type)?;
        state.serialize_field("file", &self.file_path())?;
        state.serialize_field("line", &self.line)?;
        state.serialize_field("column", &self.column)?;
        state.serialize_field("message", &self.message())?;
        state.serialize_field("full_message", &self.full_message)?;
        state.end()
    }
}
