use anyhow::Context;
use argh::FromArgs;
use mysh::command::Streams;
use mysh::config::BackendConfig;
use mysh::env::Environment;
use mysh::io_adapters::{EditorReader, LineReader, StreamReader};
use mysh::{Interpreter, ShellExit};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Log filter variable, e.g. `MYSH_LOG=debug`.
const LOG_FILTER_VAR: &str = "MYSH_LOG";

#[derive(FromArgs)]
/// Interactive shell with built-ins, external programs and `ai:` prompts.
struct Args {
    #[argh(option)]
    /// backend executable used for `ai:` prompts (overrides $MYSH_LLAMA_RUN).
    llama_run: Option<String>,

    #[argh(option)]
    /// model file passed to the backend (overrides $MYSH_MODEL).
    model: Option<String>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_VAR).unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(args: Args) -> anyhow::Result<ShellExit> {
    let env = Environment::new();
    let mut backend = BackendConfig::from_env(&env);
    if let Some(program) = args.llama_run {
        backend = backend.with_program(program);
    }
    if let Some(model) = args.model {
        backend = backend.with_model(model);
    }
    tracing::info!(dir = %env.current_dir.display(), backend = %backend.program, "starting mysh");

    let mut sh = Interpreter::with_backend(env, backend);
    let mut reader: Box<dyn LineReader> = if io::stdin().is_terminal() {
        Box::new(EditorReader::new().context("failed to initialize line editor")?)
    } else {
        Box::new(StreamReader::new(io::stdin().lock(), io::stdout()))
    };

    let mut out = io::stdout();
    let mut err = io::stderr();
    let exit = sh.repl(
        reader.as_mut(),
        &mut Streams {
            out: &mut out,
            err: &mut err,
        },
    )?;
    Ok(exit)
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();
    init_logging();

    match run(args) {
        Ok(exit) => {
            tracing::info!(?exit, "shell finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
