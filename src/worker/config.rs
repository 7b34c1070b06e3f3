//! Worker process descriptions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Description of how to start the worker process for one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Language the worker serves ("node", "python", ...), lower-cased.
    pub language: String,
    /// Worker executable path.
    pub executable: PathBuf,
    /// Arguments passed to the executable.
    pub args: Vec<String>,
    /// Extra environment variables for the worker process.
    pub env: HashMap<String, String>,
}

impl WorkerConfig {
    /// Create a config for the given language and executable.
    pub fn new(language: impl Into<String>, executable: impl Into<PathBuf>) -> Self {
        Self {
            language: language.into().to_ascii_lowercase(),
            executable: executable.into(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}
