use crate::ai::AiPromptFactory;
use crate::command::{CommandFactory, DispatchOutcome, Streams};
use crate::config::BackendConfig;
use crate::env::Environment;
use crate::error::{Result, ShellError};
use crate::io_adapters::{LineReader, ReadOutcome};
use crate::lexer::{self, ArgumentVector};

/// Prompt printed before every line is read.
pub const PROMPT: &str = "mysh> ";

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate: builtins and external programs.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// Why the read-dispatch loop ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellExit {
    /// The user ran `exit`.
    ExitCommand,
    /// The input stream ran dry.
    EndOfInput,
}

/// Reads lines, splits them and runs them until told to stop.
///
/// The interpreter owns the [`Environment`] shared by all iterations and a list
/// of [`CommandFactory`] objects asked in order for each command token. See
/// [`Interpreter::with_backend`] for the default order.
///
/// Example
/// ```
/// use mysh::command::Streams;
/// use mysh::io_adapters::MemWriter;
/// use mysh::{DispatchOutcome, Interpreter};
///
/// let mut sh = Interpreter::default();
/// let (mut out, mut err) = (MemWriter::new(), MemWriter::new());
/// let mut streams = Streams { out: &mut out, err: &mut err };
/// assert_eq!(sh.run_line("help", &mut streams), DispatchOutcome::Continue);
/// assert_eq!(sh.run_line("exit now", &mut streams), DispatchOutcome::Stop);
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create an interpreter with a custom set of command factories.
    pub fn new(env: Environment, commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self { env, commands }
    }

    /// Create an interpreter with the default commands, in priority order:
    /// - built-ins: `exit`, `help`, `cd` (exact match)
    /// - `ai:` prompts sent to the backend described by `backend`
    /// - external program launcher, which accepts everything else
    pub fn with_backend(env: Environment, backend: BackendConfig) -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(
            env,
            vec![
                Box::new(Factory::<Exit>::default()),
                Box::new(Factory::<Help>::default()),
                Box::new(Factory::<Cd>::default()),
                Box::new(AiPromptFactory::new(backend)),
                Box::new(Factory::<ExternalCommand>::default()),
            ],
        )
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Decide what `argv` means and run it.
    ///
    /// Errors of the chosen command are printed on the error stream; they never
    /// stop the shell. Only `exit` yields [`DispatchOutcome::Stop`].
    pub fn dispatch(&mut self, argv: &ArgumentVector<'_>, streams: &mut Streams<'_>) -> DispatchOutcome {
        let Some(name) = argv.command() else {
            return DispatchOutcome::Continue;
        };
        let args = argv.args();

        let Some(cmd) = self
            .commands
            .iter()
            .find_map(|factory| factory.try_create(&self.env, name, args))
        else {
            tracing::debug!(command = name, "no handler accepted command");
            return DispatchOutcome::Continue;
        };

        tracing::debug!(command = name, args = args.len(), "dispatching");
        match cmd.execute(streams, &mut self.env) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::debug!(command = name, error = %err, "command failed");
                report(&err, streams);
                DispatchOutcome::Continue
            }
        }
    }

    /// Split `line` into tokens and dispatch them.
    pub fn run_line(&mut self, line: &str, streams: &mut Streams<'_>) -> DispatchOutcome {
        let argv = lexer::split_into_tokens(line);
        self.dispatch(&argv, streams)
    }

    /// Prompt, read, dispatch, repeat.
    ///
    /// Returns when `exit` runs or the input ends. A fatal read failure is
    /// returned as an error and must terminate the shell; other read errors
    /// are reported and the loop goes on.
    pub fn repl(&mut self, reader: &mut dyn LineReader, streams: &mut Streams<'_>) -> Result<ShellExit> {
        loop {
            let outcome = match reader.read_line(PROMPT) {
                Ok(outcome) => outcome,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    tracing::debug!(error = %err, "read failed, continuing");
                    report(&err, streams);
                    continue;
                }
            };
            match outcome {
                ReadOutcome::Line(line) => {
                    if self.run_line(&line, streams) == DispatchOutcome::Stop {
                        return Ok(ShellExit::ExitCommand);
                    }
                }
                ReadOutcome::Interrupted => continue,
                ReadOutcome::EndOfInput => return Ok(ShellExit::EndOfInput),
            }
        }
    }
}

/// Print `err` on the error stream of the shell.
fn report(err: &ShellError, streams: &mut Streams<'_>) {
    if let Err(e) = writeln!(streams.err, "{err}").and_then(|()| streams.err.flush()) {
        tracing::warn!(error = %e, "failed to report error");
    }
}

impl Default for Interpreter {
    /// Default commands, with the process environment and backend settings
    /// taken from its variables.
    fn default() -> Self {
        let env = Environment::new();
        let backend = BackendConfig::from_env(&env);
        Self::with_backend(env, backend)
    }
}
