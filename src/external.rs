use crate::command::{CommandFactory, DispatchOutcome, ExecutableCommand, Rejected, Streams};
use crate::env::Environment;
use crate::error::{Result, ShellError};
use crate::interpreter::Factory;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// Command that is not a builtin: a program found on disk.
///
/// The child shares the shell's standard input and is connected to the
/// shell's output streams. The shell waits for it, then records its status
/// without reporting it.
pub struct ExternalCommand {
    name: String,
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(name: String, program: PathBuf, args: Vec<String>) -> Self {
        Self {
            name,
            program,
            args,
        }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let search_paths = env.get_var("PATH").unwrap_or_default();
        let command: Box<dyn ExecutableCommand> = match find_command_path(
            OsStr::new(search_paths),
            &env.current_dir,
            Path::new(name),
        ) {
            Some(program) => Box::new(ExternalCommand::new(
                name.to_string(),
                program,
                args.iter().map(|x| x.to_string()).collect(),
            )),
            None => Box::new(Rejected(ShellError::CommandNotFound {
                name: name.to_string(),
            })),
        };
        Some(command)
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        streams: &mut Streams<'_>,
        env: &mut Environment,
    ) -> Result<DispatchOutcome> {
        streams.out.flush()?;
        let stdout = streams.out.stdio()?;
        let stderr = streams.err.stdio()?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(stdout)
            .stderr(stderr)
            .env_clear()
            .envs(env.vars.iter())
            .current_dir(&env.current_dir)
            .spawn()
            .map_err(|source| spawn_error(&self.name, source))?;

        let exit_status = child.wait().map_err(|source| ShellError::Wait {
            name: self.name.clone(),
            source,
        })?;
        let code = match exit_status.code() {
            Some(x) => x,
            None => terminated_by_signal(exit_status),
        };
        tracing::debug!(command = %self.name, code, "external command finished");
        env.last_status = Some(code);
        Ok(DispatchOutcome::Continue)
    }
}

/// A program that exists but cannot be started is reported like a missing one.
fn spawn_error(name: &str, source: io::Error) -> ShellError {
    match source.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => ShellError::CommandNotFound {
            name: name.to_string(),
        },
        _ => ShellError::Spawn {
            name: name.to_string(),
            source,
        },
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command name to an executable file.
///
/// Behavior:
/// - Absolute path: returned if it is an executable file.
/// - Relative path with a separator (`bin/tool`, `./tool`): resolved against
///   `current_dir`.
/// - Bare name: each directory of `search_paths` (PATH) is tried in order;
///   relative PATH entries are resolved against `current_dir`.
/// - Empty name: `None`.
pub fn find_command_path(search_paths: &OsStr, current_dir: &Path, path: &Path) -> Option<PathBuf> {
    if path.as_os_str().is_empty() {
        return None;
    }
    if path.is_absolute() {
        return find_by_path(path);
    }

    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(x), None) => find_in_path(search_paths, current_dir, x.as_os_str()),
        _ => find_by_path(&current_dir.join(path)),
    }
}

fn find_in_path(search_paths: &OsStr, current_dir: &Path, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .filter(|dir| !dir.as_os_str().is_empty())
        .find_map(|dir| find_by_path(&current_dir.join(dir).join(cmd)))
}

fn find_by_path(path: &Path) -> Option<PathBuf> {
    if is_executable(path) {
        Some(path.to_path_buf())
    } else {
        None
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
