//! Bridge between `ai:` lines and the text-generation backend.
//!
//! `ai:tell me` and `ai: tell me` both send the prompt `tell me`. The backend
//! is started directly, without an intermediate shell, so the prompt reaches it
//! as a single argument whatever characters it contains. Its standard output is
//! forwarded to the user chunk by chunk while it is generated.

use crate::command::{CommandFactory, DispatchOutcome, ExecutableCommand, Rejected, Streams};
use crate::config::BackendConfig;
use crate::env::Environment;
use crate::error::{Result, ShellError};
use crate::external::find_command_path;
use std::ffi::OsStr;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};

/// Token prefix that routes a line to the backend.
pub const AI_PREFIX: &str = "ai:";

/// Largest prompt, in bytes, that is accepted.
pub const PROMPT_CAPACITY: usize = 1023;

/// Size of the buffer used when forwarding backend output.
const CHUNK_SIZE: usize = 4096;

/// Prompt text rebuilt from the tokens of an `ai:` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    /// Join `suffix` (the first token without its `ai:` prefix) and `rest` with
    /// single spaces. An empty suffix contributes nothing, so a bare `ai:`
    /// gives an empty prompt.
    pub fn from_tokens(suffix: &str, rest: &[&str]) -> Result<Self> {
        let mut text = String::new();
        for piece in std::iter::once(suffix).chain(rest.iter().copied()) {
            if piece.is_empty() {
                continue;
            }
            let needed = text.len() + usize::from(!text.is_empty()) + piece.len();
            if needed > PROMPT_CAPACITY {
                return Err(ShellError::PromptTooLong {
                    len: prompt_len(suffix, rest),
                    capacity: PROMPT_CAPACITY,
                });
            }
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(piece);
        }
        Ok(Prompt(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn prompt_len(suffix: &str, rest: &[&str]) -> usize {
    let pieces: Vec<&str> = std::iter::once(suffix)
        .chain(rest.iter().copied())
        .filter(|p| !p.is_empty())
        .collect();
    pieces.iter().map(|p| p.len()).sum::<usize>() + pieces.len().saturating_sub(1)
}

/// Recognizes `ai:`-prefixed commands.
pub struct AiPromptFactory {
    config: BackendConfig,
}

impl AiPromptFactory {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }
}

impl CommandFactory for AiPromptFactory {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let suffix = name.strip_prefix(AI_PREFIX)?;
        Some(match Prompt::from_tokens(suffix, args) {
            Ok(prompt) => Box::new(AiPrompt {
                prompt,
                config: self.config.clone(),
            }),
            Err(e) => Box::new(Rejected(e)),
        })
    }
}

/// One invocation of the backend.
pub struct AiPrompt {
    prompt: Prompt,
    config: BackendConfig,
}

impl ExecutableCommand for AiPrompt {
    fn execute(
        self: Box<Self>,
        streams: &mut Streams<'_>,
        env: &mut Environment,
    ) -> Result<DispatchOutcome> {
        let args = self.config.backend_args(self.prompt.as_str());
        let program = &self.config.program;
        tracing::debug!(
            command = %shell_words::join(std::iter::once(program.as_str()).chain(args.iter().map(String::as_str))),
            "starting backend"
        );

        let backend_spawn_error = |source: io::Error| ShellError::BackendSpawn {
            program: program.clone(),
            source,
        };
        let resolved = find_command_path(
            OsStr::new(env.get_var("PATH").unwrap_or_default()),
            &env.current_dir,
            Path::new(program),
        )
        .ok_or_else(|| backend_spawn_error(io::Error::from(io::ErrorKind::NotFound)))?;

        streams.out.flush()?;
        let mut child = Command::new(resolved)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(streams.err.stdio()?)
            .env_clear()
            .envs(env.vars.iter())
            .current_dir(&env.current_dir)
            .spawn()
            .map_err(backend_spawn_error)?;

        // The pipe is closed before waiting, so a backend still writing after a
        // forwarding failure gets EPIPE instead of blocking forever.
        let forwarded = match child.stdout.take() {
            Some(mut output) => forward_output(&mut output, &mut *streams.out),
            None => Ok(0),
        };
        let status = child.wait();

        let bytes = forwarded.map_err(ShellError::BackendStream)?;
        match status {
            Ok(status) => tracing::debug!(bytes, %status, "backend finished"),
            Err(e) => tracing::warn!(error = %e, "failed to wait for backend"),
        }
        Ok(DispatchOutcome::Continue)
    }
}

/// Copy `output` to `out` one read at a time, flushing after every chunk.
fn forward_output<R, W>(output: &mut R, out: &mut W) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = match output.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        out.write_all(&buf[..n])?;
        out.flush()?;
        total += n as u64;
    }
}
