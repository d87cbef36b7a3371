use std::collections::HashMap;
use std::env as stdenv;
use std::ffi::OsString;
use std::path::PathBuf;

/// State that outlives a single loop iteration.
///
/// The shell never changes the working directory of its own process: `cd`
/// updates `current_dir`, and every spawned program is started there.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Variables handed to spawned programs (e.g. PATH, HOME, PWD).
    pub vars: HashMap<String, String>,
    /// Working directory for built-ins and spawned programs.
    pub current_dir: PathBuf,
    /// Exit code of the last external command, or 128+signal if it was killed.
    /// Recorded for inspection only; it is never shown to the user.
    pub last_status: Option<i32>,
}

impl Environment {
    /// Capture the variables and working directory of the current process.
    pub fn new() -> Self {
        let vars = unicode_vars(stdenv::vars_os());
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_dir(vars, current_dir)
    }

    pub fn with_dir(vars: HashMap<String, String>, current_dir: PathBuf) -> Self {
        Self {
            vars,
            current_dir,
            last_status: None,
        }
    }

    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Switch the working directory and keep `PWD` in step with it.
    pub fn change_dir(&mut self, dir: PathBuf) {
        self.set_var("PWD", dir.to_string_lossy().into_owned());
        self.current_dir = dir;
    }
}

/// Keep the variables whose name and value are both valid Unicode.
fn unicode_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> HashMap<String, String> {
    vars.into_iter()
        .filter_map(|(key, val)| match (key.into_string(), val.into_string()) {
            (Ok(key), Ok(val)) => Some((key, val)),
            (key, _) => {
                tracing::debug!(var = ?key, "skipping variable that is not valid Unicode");
                None
            }
        })
        .collect()
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
