//! Spawning a child and capturing its merged output without deadlocking.
//!
//! The child's stdout and stderr share one pipe. A reader thread pulls fixed
//! size chunks off that pipe and hands them over a channel, while the calling
//! thread alternates between collecting whatever has arrived and a short,
//! bounded wait for the child to exit. The parent therefore never blocks on
//! exit alone while the child is blocked on a full pipe.

use std::io::{ErrorKind, PipeReader, PipeWriter, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::error::ProcessError;

/// Size of a single read from the child's output pipe.
const READ_CHUNK_SIZE: usize = 4096;

/// Upper bound on one wait for the child to exit between output reads.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long the final drain waits for another chunk after the child exits.
///
/// A grandchild that inherited the pipe can hold it open indefinitely, so
/// the drain stops once the pipe has been quiet this long instead of
/// waiting for end-of-file.
const FINAL_DRAIN_WINDOW: Duration = Duration::from_millis(50);

/// A one-shot child process with an accumulated argument list and output.
///
/// Arguments persist across [`execute`](Self::execute) calls until
/// [`clear_arguments`](Self::clear_arguments); captured output keeps growing
/// until [`clear_output`](Self::clear_output).
#[derive(Debug, Default)]
pub struct Process {
    /// Display form of the command, quoted when it contains whitespace.
    command: String,
    /// The program actually spawned.
    program: PathBuf,
    arguments: Vec<String>,
    output: Vec<u8>,
}

impl Process {
    /// Creates a process for the given command.
    ///
    /// A command containing whitespace is wrapped in double quotes for
    /// display unless it is already quoted. The quotes never reach the OS.
    pub fn new(command: impl AsRef<Path>) -> Self {
        let raw = command.as_ref().to_string_lossy().into_owned();
        let program = match raw.strip_prefix('"') {
            Some(rest) => PathBuf::from(rest.strip_suffix('"').unwrap_or(rest)),
            None => command.as_ref().to_path_buf(),
        };
        Self {
            command: quote_command(raw),
            program,
            arguments: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Appends one argument token. No quoting is applied.
    pub fn add_argument(&mut self, arg: impl Into<String>) {
        self.arguments.push(arg.into());
    }

    /// Appends argument tokens in order.
    pub fn add_arguments<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
    }

    /// Removes all accumulated arguments.
    pub fn clear_arguments(&mut self) {
        self.arguments.clear();
    }

    /// Discards all captured output.
    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    /// Truncates the argument list to its first `len` tokens.
    pub fn truncate_arguments(&mut self, len: usize) {
        self.arguments.truncate(len);
    }

    /// Returns the display form of the command.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns the accumulated argument tokens.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Returns the argument tokens joined with one leading space each.
    pub fn command_line(&self) -> String {
        let mut line = String::with_capacity(self.arguments.iter().map(|a| a.len() + 1).sum());
        for arg in &self.arguments {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Returns everything the child wrote to stdout and stderr so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Consumes the process, returning the captured output.
    pub fn into_output(self) -> Vec<u8> {
        self.output
    }

    /// Runs the child to completion, capturing its merged output.
    ///
    /// Returns the child's exit code, or `Ok(None)` when the child ended
    /// without one (killed by a signal) or waiting on it failed. Only pipe
    /// creation and spawning are reported as errors.
    pub fn execute(&mut self) -> Result<Option<i32>, ProcessError> {
        let (output_reader, output_writer) = std::io::pipe().map_err(ProcessError::BrokenPipe)?;
        let error_writer = output_writer
            .try_clone()
            .map_err(ProcessError::BrokenPipe)?;
        let (input_reader, input_writer) = std::io::pipe().map_err(ProcessError::BrokenPipe)?;

        log::debug!("executing {}{}", self.command, self.command_line());

        let mut child = self.spawn(input_reader, output_writer, error_writer)?;
        let chunks = start_drain(output_reader);
        let exit_code = self.wait_draining(&mut child, &chunks);

        // Held open until exit so the child never sees a closed stdin.
        drop(input_writer);

        log::debug!(
            "{} exited with {:?}, {} bytes of output",
            self.command,
            exit_code,
            self.output.len()
        );
        Ok(exit_code)
    }

    fn spawn(
        &self,
        stdin: PipeReader,
        stdout: PipeWriter,
        stderr: PipeWriter,
    ) -> Result<Child, ProcessError> {
        let mut command = Command::new(&self.program);
        for arg in &self.arguments {
            push_argument(&mut command, arg);
        }
        command.stdin(stdin).stdout(stdout).stderr(stderr);

        // `command` holds the parent's copies of the write ends; they are
        // released when it drops here, so the reader sees EOF after exit.
        command.spawn().map_err(|source| ProcessError::SpawnFailed {
            command: self.command.clone(),
            source,
        })
    }

    fn wait_draining(
        &mut self,
        child: &mut Child,
        chunks: &Receiver<Vec<u8>>,
    ) -> Option<i32> {
        loop {
            self.collect_available(chunks);

            match child.try_wait() {
                Ok(Some(status)) => {
                    self.final_drain(chunks);
                    if status.code().is_none() {
                        log::warn!("{} terminated without an exit code", self.command);
                    }
                    return status.code();
                }
                Ok(None) => match chunks.recv_timeout(EXIT_POLL_INTERVAL) {
                    Ok(chunk) => self.output.extend_from_slice(&chunk),
                    Err(RecvTimeoutError::Timeout) => {}
                    // The child closed its output but is still running.
                    Err(RecvTimeoutError::Disconnected) => thread::sleep(EXIT_POLL_INTERVAL),
                },
                Err(e) => {
                    log::warn!("waiting for {} failed: {e}", self.command);
                    self.collect_available(chunks);
                    return None;
                }
            }
        }
    }

    /// Collects output still buffered in the pipe after the child exited.
    ///
    /// The reader thread is left running; it ends on its own at end-of-file
    /// or when its next send finds the receiver gone.
    fn final_drain(&mut self, chunks: &Receiver<Vec<u8>>) {
        loop {
            match chunks.recv_timeout(FINAL_DRAIN_WINDOW) {
                Ok(chunk) => self.output.extend_from_slice(&chunk),
                Err(RecvTimeoutError::Timeout) => {
                    log::debug!("{} left its output pipe open after exiting", self.command);
                    return;
                }
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }

    fn collect_available(&mut self, chunks: &Receiver<Vec<u8>>) {
        while let Ok(chunk) = chunks.try_recv() {
            self.output.extend_from_slice(&chunk);
        }
    }
}

/// Spawns the thread that reads the output pipe until end-of-file.
fn start_drain(mut reader: PipeReader) -> Receiver<Vec<u8>> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let mut buffer = [0u8; READ_CHUNK_SIZE];
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    if sender.send(buffer[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::warn!("reading child output failed: {e}");
                    break;
                }
            }
        }
    });
    receiver
}

/// Formats a path as one argument token.
///
/// Tokens reach a Windows child verbatim, so there a path containing
/// whitespace is wrapped in double quotes. Elsewhere every token is its own
/// argv entry and the path is used as is.
pub fn path_argument(path: &Path) -> String {
    let text = path.to_string_lossy();
    if cfg!(windows) && text.contains(char::is_whitespace) {
        format!("\"{text}\"")
    } else {
        text.into_owned()
    }
}

fn quote_command(command: String) -> String {
    if command.starts_with('"') || !command.contains(char::is_whitespace) {
        command
    } else {
        format!("\"{command}\"")
    }
}

#[cfg(windows)]
fn push_argument(command: &mut Command, arg: &str) {
    use std::os::windows::process::CommandExt;
    command.raw_arg(arg);
}

#[cfg(not(windows))]
fn push_argument(command: &mut Command, arg: &str) {
    command.arg(arg);
}
