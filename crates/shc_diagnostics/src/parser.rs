//! Splitting raw compiler output into [`CompilerMessage`] records.
//!
//! Parsing runs in two passes. The first groups lines into blocks: every line
//! that does not start with a space or tab opens a new block, indented lines
//! (source excerpts, caret markers) continue the current one. The second pass
//! extracts `<path>:<line>[:<column>]: <type>: <body>` from each block.
//!
//! Parsing never fails. A block whose location prefix looks numeric but cannot
//! be read keeps only its full text.

use crate::message::{CompilerMessage, Location, TextSpan};
use crate::message_type::MessageType;

const FIELD_SEPARATOR: &str = ": ";

/// Parses the complete text a compiler printed into ordered messages.
///
/// Both `\n` and `\r\n` line endings are accepted. Blank blocks are dropped.
pub fn parse_compiler_messages(text: &str) -> Vec<CompilerMessage> {
    segment(text)
        .into_iter()
        .map(|block| parse_block(block.to_string()))
        .collect()
}

/// Pass one: returns the non-blank blocks, trailing line breaks trimmed.
fn segment(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut start = 0;
    let mut offset = 0;
    for line in Lines::new(text) {
        let continues = line.starts_with([' ', '\t']);
        if offset > start && !continues {
            push_block(&mut blocks, &text[start..offset]);
            start = offset;
        }
        offset += line.len();
    }
    push_block(&mut blocks, &text[start..]);
    blocks
}

fn push_block<'a>(blocks: &mut Vec<&'a str>, block: &'a str) {
    let block = block.trim_end_matches(['\r', '\n']);
    if !block.trim().is_empty() {
        blocks.push(block);
    }
}

/// Lines of `text`, each including its terminator (`\n`, `\r\n` or `\r`).
struct Lines<'a> {
    rest: &'a str,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let end = match self.rest.find(['\r', '\n']) {
            Some(i) if self.rest[i..].starts_with("\r\n") => i + 2,
            Some(i) => i + 1,
            None => self.rest.len(),
        };
        let (line, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(line)
    }
}

/// Pass two: extracts the fields of one block.
fn parse_block(text: String) -> CompilerMessage {
    let mut message = CompilerMessage::unstructured(text);
    let text = message.full_message();

    let Some(first_break) = text.find(FIELD_SEPARATOR) else {
        return message;
    };

    let mut type_start = 0;
    let mut location = None;
    if text[..first_break].ends_with(|c: char| c.is_ascii_digit()) {
        match parse_location(text, first_break) {
            Some(parsed) => {
                location = Some(parsed);
                type_start = first_break + FIELD_SEPARATOR.len();
            }
            None => return message,
        }
    }

    let type_break = text[type_start..]
        .find(FIELD_SEPARATOR)
        .map(|i| type_start + i);
    let fields = type_break.map(|type_end| {
        let message_type = MessageType::from_type_section(&text[type_start..type_end]);
        let body_start = type_end + FIELD_SEPARATOR.len();
        let body = (body_start < text.len()).then(|| TextSpan::from_range(body_start..text.len()));
        (message_type, body)
    });

    if let Some(location) = location {
        message.set_location(location);
    }
    if let Some((message_type, body)) = fields {
        message.set_message_type(message_type);
        if let Some(body) = body {
            message.set_message(body);
        }
    }
    message
}

/// Reads `<path>:<line>` or `<path>:<line>:<column>` ending at `end`.
///
/// Returns `None` when a number does not parse or an expected colon is
/// missing.
fn parse_location(text: &str, end: usize) -> Option<Location> {
    let prefix = &text[..end];
    let last_colon = prefix.rfind(':')?;
    let last_number = parse_number(&prefix[last_colon + 1..])?;

    let before = &prefix[..last_colon];
    let (token_start, previous_colon) = match before.rfind(':') {
        Some(i) => (i + 1, Some(i)),
        None => (0, None),
    };
    let previous_token = &before[token_start..];

    if is_numeric(previous_token) {
        let line_colon = previous_colon?;
        Some(Location {
            file_path: TextSpan::new(0, line_colon),
            line: parse_number(previous_token)?,
            column: Some(last_number),
        })
    } else {
        Some(Location {
            file_path: TextSpan::new(0, last_colon),
            line: last_number,
            column: None,
        })
    }
}

fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn parse_number(token: &str) -> Option<u32> {
    if is_numeric(token) {
        token.parse().ok()
    } else {
        None
    }
}
