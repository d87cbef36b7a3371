use crate::env::Environment;
use crate::error::Result;
use std::fs::File;
use std::io::{self, Write};
use std::process::Stdio;

/// What the loop should do after a command has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Continue,
    Stop,
}

/// A writable stream that spawned programs can be connected to as well.
///
/// Built-ins write through [`Write`]; external programs and the text-generation
/// backend receive a [`Stdio`] handle for the same destination.
pub trait Stdout: Write {
    /// A handle suitable for `std::process::Command` that writes where `self` does.
    fn stdio(&self) -> io::Result<Stdio>;
}

impl Stdout for io::Stdout {
    fn stdio(&self) -> io::Result<Stdio> {
        Ok(Stdio::inherit())
    }
}

impl Stdout for io::Stderr {
    fn stdio(&self) -> io::Result<Stdio> {
        Ok(Stdio::inherit())
    }
}

impl Stdout for File {
    fn stdio(&self) -> io::Result<Stdio> {
        Ok(self.try_clone()?.into())
    }
}

/// The two output streams every command is run with.
pub struct Streams<'a> {
    pub out: &'a mut dyn Stdout,
    pub err: &'a mut dyn Stdout,
}

/// Object-safe trait for anything the dispatcher can run.
pub trait ExecutableCommand {
    fn execute(
        self: Box<Self>,
        streams: &mut Streams<'_>,
        env: &mut Environment,
    ) -> Result<DispatchOutcome>;
}

/// Recognizes a command by its first token and builds it.
///
/// Factories are asked in priority order; the first one returning `Some`
/// handles the line.
pub trait CommandFactory {
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}

/// A command that failed before it could run. Executing it reports the error.
pub(crate) struct Rejected(pub crate::error::ShellError);

impl ExecutableCommand for Rejected {
    fn execute(
        self: Box<Self>,
        _streams: &mut Streams<'_>,
        _env: &mut Environment,
    ) -> Result<DispatchOutcome> {
        Err(self.0)
    }
}
