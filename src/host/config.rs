//! Host configuration.

use crate::debug::FileLoggingMode;
use crate::worker::WorkerConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long cold-start-sensitive background work is deferred on elastic
/// hosting tiers.
const DEFAULT_COLD_START_DELAY: Duration = Duration::from_secs(240);

/// Configuration for a [`FunctionHost`](crate::host::FunctionHost).
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Root directory of the function app.
    pub script_root_path: PathBuf,
    /// Root directory for host log artifacts (the debug sentinel lives
    /// under `<log_root>/Host/`).
    pub log_root_path: PathBuf,
    /// File logging policy.
    pub file_logging_mode: FileLoggingMode,
    /// Deferral applied to the sentinel watcher on dynamic SKUs.
    pub cold_start_delay: Duration,
    /// Whether dispatch goes through a generic HTTP worker, which makes
    /// the function set language-agnostic.
    pub http_worker: bool,
    /// Worker process descriptions, one per supported language.
    pub workers: Vec<WorkerConfig>,
}

impl HostConfig {
    /// Create a configuration rooted at the given app directory. The log
    /// root defaults to `<script_root>/logs`.
    pub fn new(script_root: impl Into<PathBuf>) -> Self {
        let script_root_path = script_root.into();
        let log_root_path = script_root_path.join("logs");
        Self {
            script_root_path,
            log_root_path,
            file_logging_mode: FileLoggingMode::default(),
            cold_start_delay: DEFAULT_COLD_START_DELAY,
            http_worker: false,
            workers: Vec::new(),
        }
    }

    /// Set the log root directory.
    pub fn log_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_root_path = path.into();
        self
    }

    /// Set the file logging policy.
    pub fn file_logging_mode(mut self, mode: FileLoggingMode) -> Self {
        self.file_logging_mode = mode;
        self
    }

    /// Override the cold-start deferral. Tests shorten this to keep the
    /// sentinel watcher responsive.
    pub fn cold_start_delay(mut self, delay: Duration) -> Self {
        self.cold_start_delay = delay;
        self
    }

    /// Mark dispatch as going through a generic HTTP worker.
    pub fn http_worker(mut self, http_worker: bool) -> Self {
        self.http_worker = http_worker;
        self
    }

    /// Register a worker process description.
    pub fn worker(mut self, worker: WorkerConfig) -> Self {
        self.workers.push(worker);
        self
    }

    /// The app root directory.
    pub fn script_root(&self) -> &Path {
        &self.script_root_path
    }
}
