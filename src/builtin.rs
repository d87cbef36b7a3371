use crate::command::{CommandFactory, DispatchOutcome, ExecutableCommand, Streams};
use crate::env::Environment;
use crate::error::{Result, ShellError};
use crate::interpreter::Factory;
use std::fs;
use std::path::PathBuf;

/// Text printed by `help`.
pub(crate) const HELP_TEXT: &str = "\
Available commands:
cd [dir]     - Change directory
exit         - Exit the shell
help         - Show this help message
ai: <prompt> - Run AI prompt using llama model
Other commands run as normal shell commands
";

/// Commands interpreted by the shell itself.
///
/// A builtin is matched on the exact first token and runs in-process.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "exit" or "cd".
    fn name() -> &'static str;

    /// Build the command from the tokens following its name.
    fn from_args(args: &[&str]) -> Self;

    fn execute(self, streams: &mut Streams<'_>, env: &mut Environment)
    -> Result<DispatchOutcome>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        streams: &mut Streams<'_>,
        env: &mut Environment,
    ) -> Result<DispatchOutcome> {
        <T as BuiltinCommand>::execute(*self, streams, env)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(Box::new(T::from_args(args)))
        } else {
            None
        }
    }
}

/// Leave the shell. Trailing arguments are ignored.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn from_args(_args: &[&str]) -> Self {
        Exit
    }

    fn execute(self, _streams: &mut Streams<'_>, _env: &mut Environment) -> Result<DispatchOutcome> {
        Ok(DispatchOutcome::Stop)
    }
}

/// Print the list of built-in commands.
pub struct Help;

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn from_args(_args: &[&str]) -> Self {
        Help
    }

    fn execute(self, streams: &mut Streams<'_>, _env: &mut Environment) -> Result<DispatchOutcome> {
        streams.out.write_all(HELP_TEXT.as_bytes())?;
        streams.out.flush()?;
        Ok(DispatchOutcome::Continue)
    }
}

/// Change the shell's working directory.
///
/// Only the first argument is used. Relative targets are resolved against the
/// current directory of the shell, not of the process.
pub struct Cd {
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn from_args(args: &[&str]) -> Self {
        Cd {
            target: args.first().map(|t| t.to_string()),
        }
    }

    fn execute(self, _streams: &mut Streams<'_>, env: &mut Environment) -> Result<DispatchOutcome> {
        let target = self.target.ok_or(ShellError::MissingCdArgument)?;

        let new_dir = env.current_dir.join(PathBuf::from(&target));
        let canonical = fs::canonicalize(&new_dir).map_err(|source| ShellError::ChangeDir {
            target: target.clone(),
            source,
        })?;
        if !canonical.is_dir() {
            return Err(ShellError::NotADirectory(canonical));
        }

        tracing::debug!(dir = %canonical.display(), "changing directory");
        env.change_dir(canonical);
        Ok(DispatchOutcome::Continue)
    }
}
