//! A small interactive shell with a bridge to a local text-generation backend.
//!
//! Each line read from the user is split on whitespace and handed to the
//! [`Interpreter`], which routes it to a built-in (`exit`, `help`, `cd`), to the
//! `ai:` prompt bridge, or to an external program. There are no pipelines,
//! redirections or quoting: a line is a flat argument vector.
//!
//! The public modules expose the pieces the loop is built from so they can be
//! driven individually, e.g. with in-memory readers and writers in tests.

pub mod ai;
mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
mod external;
mod interpreter;
pub mod io_adapters;
pub mod lexer;

pub use command::DispatchOutcome;
pub use error::ShellError;
pub use interpreter::{Interpreter, PROMPT, ShellExit};
