//! The result of one compile call.

use serde::Serialize;
use shc_diagnostics::CompilerMessage;

/// What one compile call produced, apart from artifacts.
///
/// The error and warning counts are derived from the message list when the
/// summary is built and cannot drift from it afterwards.
#[derive(Clone, Debug, Serialize)]
pub struct CompileSummary {
    exit_code: Option<i32>,
    arguments: Vec<String>,
    messages: Vec<CompilerMessage>,
    error_count: usize,
    warning_count: usize,
}

impl CompileSummary {
    /// Builds a summary, counting errors and warnings in `messages`.
    ///
    /// Every message for which [`CompilerMessage::is_error`] holds counts as
    /// an error, so critical messages are errors too.
    pub fn new(
        exit_code: Option<i32>,
        arguments: Vec<String>,
        messages: Vec<CompilerMessage>,
    ) -> Self {
        let error_count = messages.iter().filter(|msg| msg.is_error()).count();
        let warning_count = messages.iter().filter(|msg| msg.is_warning()).count();
        Self {
            exit_code,
            arguments,
            messages,
            error_count,
            warning_count,
        }
    }

    /// The compiler's exit status. `None` when it could not be determined.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Every argument token the compiler was invoked with.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// The parsed messages in output order.
    pub fn messages(&self) -> &[CompilerMessage] {
        &self.messages
    }

    /// Number of error messages.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Number of warning messages.
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Returns `true` if the compiler exited with code 0 and reported no errors.
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0) && self.error_count == 0
    }

    /// Consumes the summary, returning its messages.
    pub fn into_messages(self) -> Vec<CompilerMessage> {
        self.messages
    }
}
