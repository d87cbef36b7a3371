//! Settings of the text-generation backend used by `ai:` prompts.
//!
//! Values come from built-in defaults, then the `MYSH_LLAMA_RUN` and
//! `MYSH_MODEL` variables, then command-line flags. Nothing is read from or
//! written to disk.

use crate::env::Environment;

pub const DEFAULT_BACKEND_PROGRAM: &str = "llama-run";
pub const DEFAULT_MODEL_PATH: &str = "models/mistral-7b-instruct-v0.1.Q4_K_M.gguf";
pub const DEFAULT_N_PREDICT: u32 = 50;
pub const DEFAULT_CTX_SIZE: u32 = 2048;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const BACKEND_PROGRAM_VAR: &str = "MYSH_LLAMA_RUN";
pub const MODEL_PATH_VAR: &str = "MYSH_MODEL";

#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    /// Executable to run; bare names are looked up in PATH.
    pub program: String,
    /// Model file handed to the backend as its first argument.
    pub model: String,
    /// Maximum number of tokens to generate.
    pub n_predict: u32,
    /// Context window size.
    pub ctx_size: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_BACKEND_PROGRAM.to_string(),
            model: DEFAULT_MODEL_PATH.to_string(),
            n_predict: DEFAULT_N_PREDICT,
            ctx_size: DEFAULT_CTX_SIZE,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl BackendConfig {
    /// Defaults with paths overridden by the shell's variables, when set.
    pub fn from_env(env: &Environment) -> Self {
        let mut config = Self::default();
        if let Some(program) = env.get_var(BACKEND_PROGRAM_VAR).filter(|v| !v.is_empty()) {
            config.program = program.to_string();
        }
        if let Some(model) = env.get_var(MODEL_PATH_VAR).filter(|v| !v.is_empty()) {
            config.model = model.to_string();
        }
        config
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Arguments following the program name, prompt included.
    pub fn backend_args(&self, prompt: &str) -> Vec<String> {
        vec![
            self.model.clone(),
            prompt.to_string(),
            "--n_predict".to_string(),
            self.n_predict.to_string(),
            "--ctx-size".to_string(),
            self.ctx_size.to_string(),
            "--temp".to_string(),
            self.temperature.to_string(),
        ]
    }
}
