//! Scripted sessions driven through the read-dispatch loop.

use mysh::command::Streams;
use mysh::config::BackendConfig;
use mysh::env::Environment;
use mysh::io_adapters::{LineReader, MemWriter, ReadOutcome, StreamReader};
use mysh::{Interpreter, ShellError, ShellExit};
use std::collections::HashMap;
use std::io::{self, Cursor};

struct Session {
    result: Result<ShellExit, ShellError>,
    prompts: String,
    out: String,
    err: String,
}

fn shell() -> Interpreter {
    let mut vars = HashMap::new();
    if let Ok(path) = std::env::var("PATH") {
        vars.insert("PATH".to_string(), path);
    }
    let env = Environment::with_dir(vars, std::env::temp_dir());
    Interpreter::with_backend(env, BackendConfig::default().with_program("/nonexistent/llama-run"))
}

fn session(sh: &mut Interpreter, script: &str) -> Session {
    let mut reader = StreamReader::new(Cursor::new(script.to_string()), Vec::new());
    let (mut out, out_handle) = MemWriter::with_handle();
    let (mut err, err_handle) = MemWriter::with_handle();
    let result = sh.repl(
        &mut reader,
        &mut Streams {
            out: &mut out,
            err: &mut err,
        },
    );
    let out = String::from_utf8(out_handle.borrow().clone()).unwrap();
    let err = String::from_utf8(err_handle.borrow().clone()).unwrap();
    Session {
        result,
        prompts: String::from_utf8(reader.into_prompt_output()).unwrap(),
        out,
        err,
    }
}

#[test]
fn end_of_input_terminates_without_another_prompt() {
    let mut sh = shell();
    let s = session(&mut sh, "help\n");
    assert_eq!(s.result.unwrap(), ShellExit::EndOfInput);
    assert_eq!(s.prompts, "mysh> mysh> ");
    assert!(s.out.starts_with("Available commands:\n"));
    assert!(s.err.is_empty());
}

#[test]
fn empty_input_ends_after_first_prompt() {
    let mut sh = shell();
    let s = session(&mut sh, "");
    assert_eq!(s.result.unwrap(), ShellExit::EndOfInput);
    assert_eq!(s.prompts, "mysh> ");
    assert!(s.out.is_empty() && s.err.is_empty());
}

#[test]
fn last_line_without_newline_is_still_run() {
    let mut sh = shell();
    let s = session(&mut sh, "help\nexit");
    assert_eq!(s.result.unwrap(), ShellExit::ExitCommand);
    assert_eq!(s.out.matches("Available commands:").count(), 1);
}

#[test]
fn recoverable_errors_keep_the_loop_going() {
    let mut sh = shell();
    let script = "\
nonexistent_cmd_xyz
cd
cd /definitely/not/here
ai:
ai: tell me a joke
   \t
help
exit 1 2 3
help
";
    let s = session(&mut sh, script);
    assert_eq!(s.result.unwrap(), ShellExit::ExitCommand);
    assert_eq!(s.prompts, "mysh> ".repeat(8));

    let errors: Vec<&str> = s.err.lines().collect();
    assert_eq!(errors[0], "Error: 'nonexistent_cmd_xyz' is not a recognized command.");
    assert_eq!(errors[1], "Tip: Type 'help' to see available commands.");
    assert_eq!(errors[2], "cd: expected argument");
    assert!(errors[3].starts_with("cd: /definitely/not/here: "));
    assert!(errors[4].starts_with("Failed to run /nonexistent/llama-run"));
    assert!(errors[5].starts_with("Failed to run /nonexistent/llama-run"));
    assert_eq!(errors.len(), 6);

    assert_eq!(s.out.matches("Available commands:").count(), 1);
}

#[test]
fn undecodable_bytes_do_not_end_the_session() {
    let mut sh = shell();
    let mut reader = StreamReader::new(Cursor::new(b"caf\xe9\nhelp\nexit\n".to_vec()), Vec::new());
    let (mut out, out_handle) = MemWriter::with_handle();
    let (mut err, err_handle) = MemWriter::with_handle();
    let result = sh.repl(
        &mut reader,
        &mut Streams {
            out: &mut out,
            err: &mut err,
        },
    );
    assert_eq!(result.unwrap(), ShellExit::ExitCommand);

    let out = String::from_utf8(out_handle.borrow().clone()).unwrap();
    assert!(out.starts_with("Available commands:"));
    let err = String::from_utf8(err_handle.borrow().clone()).unwrap();
    assert_eq!(
        err,
        "Error: 'caf\u{fffd}' is not a recognized command.\n\
         Tip: Type 'help' to see available commands.\n"
    );
}

#[test]
fn cd_persists_across_iterations() {
    let dir = tempfile::tempdir().unwrap();
    let canonical = std::fs::canonicalize(dir.path()).unwrap();
    std::fs::create_dir(canonical.join("sub")).unwrap();

    let mut sh = shell();
    let script = format!("cd {}\ncd sub\n", canonical.display());
    let s = session(&mut sh, &script);
    assert_eq!(s.result.unwrap(), ShellExit::EndOfInput);
    assert!(s.err.is_empty(), "{}", s.err);
    assert_eq!(sh.env().current_dir, canonical.join("sub"));
}

struct FailingReader {
    lines: Vec<&'static str>,
}

impl LineReader for FailingReader {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadOutcome, ShellError> {
        match self.lines.pop() {
            Some(line) => Ok(ReadOutcome::Line(line.to_string())),
            None => Err(ShellError::Input(io::Error::new(
                io::ErrorKind::InvalidData,
                "terminal went away",
            ))),
        }
    }
}

#[test]
fn unreadable_input_is_fatal() {
    let mut sh = shell();
    let mut reader = FailingReader { lines: vec!["help"] };
    let mut out = MemWriter::new();
    let mut err = MemWriter::new();
    let result = sh.repl(
        &mut reader,
        &mut Streams {
            out: &mut out,
            err: &mut err,
        },
    );
    let err = result.unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("terminal went away"));
}

struct InterruptingReader {
    outcomes: Vec<ReadOutcome>,
}

impl LineReader for InterruptingReader {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadOutcome, ShellError> {
        Ok(self.outcomes.pop().unwrap_or(ReadOutcome::EndOfInput))
    }
}

#[test]
fn interrupt_at_prompt_reads_again() {
    let mut sh = shell();
    let mut reader = InterruptingReader {
        outcomes: vec![
            ReadOutcome::Line("exit".to_string()),
            ReadOutcome::Interrupted,
            ReadOutcome::Interrupted,
        ],
    };
    let mut out = MemWriter::new();
    let mut err = MemWriter::new();
    let result = sh.repl(
        &mut reader,
        &mut Streams {
            out: &mut out,
            err: &mut err,
        },
    );
    assert_eq!(result.unwrap(), ShellExit::ExitCommand);
    assert!(reader.outcomes.is_empty());
}
