//! Line sources for the shell loop and an in-memory output sink.

use crate::command::Stdout;
use crate::error::{Result, ShellError};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::cell::RefCell;
use std::io::{self, BufRead, Result as IoResult, Write};
use std::process::Stdio;
use std::rc::Rc;

/// Outcome of asking the user for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A complete line; any trailing terminator is kept.
    Line(String),
    /// The user pressed Ctrl-C at the prompt.
    Interrupted,
    /// No more input will arrive.
    EndOfInput,
}

/// Blocking source of input lines.
pub trait LineReader {
    /// Show `prompt` and wait for a line.
    ///
    /// End of input is not an error. Errors for which
    /// [`ShellError::is_fatal`] holds end the shell; the others are reported
    /// and the next line is read.
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;
}

/// Interactive reader with line editing and in-memory history.
pub struct EditorReader {
    editor: DefaultEditor,
}

impl EditorReader {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(readline_to_io).map_err(ShellError::Input)?;
        Ok(Self { editor })
    }
}

impl LineReader for EditorReader {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    // History is a convenience; failing to record it must not end the session.
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted | ReadlineError::Signal(_)) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::EndOfInput),
            // Raised for bytes that do not decode; the terminal is still usable.
            Err(ReadlineError::Io(e)) if e.kind() == io::ErrorKind::InvalidData => {
                Err(ShellError::UndecodableLine(e))
            }
            Err(err) => Err(ShellError::Input(readline_to_io(err))),
        }
    }
}

fn readline_to_io(err: ReadlineError) -> io::Error {
    match err {
        ReadlineError::Io(e) => e,
        other => io::Error::other(other.to_string()),
    }
}

/// Plain reader over any buffered stream, e.g. piped standard input.
///
/// The prompt is written to `prompt_out` and flushed before every read.
/// Bytes that are not valid UTF-8 are replaced with U+FFFD.
pub struct StreamReader<R, W> {
    input: R,
    prompt_out: W,
}

impl<R: BufRead, W: Write> StreamReader<R, W> {
    pub fn new(input: R, prompt_out: W) -> Self {
        Self { input, prompt_out }
    }

    pub fn into_prompt_output(self) -> W {
        self.prompt_out
    }
}

impl<R: BufRead, W: Write> LineReader for StreamReader<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        self.prompt_out
            .write_all(prompt.as_bytes())
            .and_then(|()| self.prompt_out.flush())
            .map_err(ShellError::Output)?;

        let mut line = Vec::new();
        match self.input.read_until(b'\n', &mut line) {
            Ok(0) => Ok(ReadOutcome::EndOfInput),
            Ok(_) => Ok(ReadOutcome::Line(String::from_utf8_lossy(&line).into_owned())),
            Err(e) => Err(ShellError::Input(e)),
        }
    }
}

/// Memory-backed writer for capturing what built-ins print.
///
/// Spawned programs connected to it get `Stdio::null()`; use a file when their
/// output has to be observed.
#[derive(Default)]
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer together with a handle to read what was written.
    pub fn with_handle() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let mw = MemWriter::new();
        let rc = mw.buf.clone();
        (mw, rc)
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

impl Stdout for MemWriter {
    fn stdio(&self) -> IoResult<Stdio> {
        Ok(Stdio::null())
    }
}
