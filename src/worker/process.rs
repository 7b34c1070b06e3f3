//! Worker process creation.

use crate::error::WorkerError;
use crate::worker::config::WorkerConfig;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::debug;

/// Environment variable carrying the worker's id into the child process.
const WORKER_ID_ENV: &str = "FUNCTIONS_WORKER_ID";

/// Environment variable carrying the script root into the child process.
const APPLICATION_DIRECTORY_ENV: &str = "FUNCTIONS_APPLICATION_DIRECTORY";

/// Handle to a created worker.
///
/// Holds the child process for process-backed workers; test factories may
/// produce detached handles with no process attached.
#[derive(Debug)]
pub struct WorkerHandle {
    /// Unique worker id.
    pub worker_id: String,
    /// Language the worker serves.
    pub language: String,
    child: Option<Child>,
}

impl WorkerHandle {
    /// A handle without an attached process.
    pub fn detached(worker_id: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            worker_id: worker_id.into(),
            language: language.into(),
            child: None,
        }
    }

    /// A handle supervising a spawned child process.
    pub fn attached(
        worker_id: impl Into<String>,
        language: impl Into<String>,
        child: Child,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            language: language.into(),
            child: Some(child),
        }
    }

    /// OS process id, when a process is attached and still running.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    /// Terminate the worker process, if one is attached.
    pub async fn kill(&mut self) -> std::io::Result<()> {
        match self.child.as_mut() {
            Some(child) => child.kill().await,
            None => Ok(()),
        }
    }
}

/// Creates one worker process per resolved language requirement.
#[async_trait]
pub trait WorkerProcessFactory: Send + Sync {
    /// Create a worker for `language` rooted at `script_root`.
    async fn create(
        &self,
        worker_id: &str,
        language: &str,
        script_root: &Path,
        config: &WorkerConfig,
    ) -> Result<WorkerHandle, WorkerError>;
}

/// [`WorkerProcessFactory`] backed by real subprocesses.
#[derive(Debug, Default)]
pub struct ProcessWorkerFactory;

impl ProcessWorkerFactory {
    /// Create a new factory.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WorkerProcessFactory for ProcessWorkerFactory {
    async fn create(
        &self,
        worker_id: &str,
        language: &str,
        script_root: &Path,
        config: &WorkerConfig,
    ) -> Result<WorkerHandle, WorkerError> {
        debug!(
            worker_id,
            language,
            executable = %config.executable.display(),
            "spawning worker process"
        );

        let mut command = Command::new(&config.executable);
        command
            .args(&config.args)
            .envs(&config.env)
            .env(WORKER_ID_ENV, worker_id)
            .env(APPLICATION_DIRECTORY_ENV, script_root)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|source| WorkerError::SpawnFailed {
            language: language.to_string(),
            source,
        })?;

        debug!(worker_id, language, pid = child.id(), "worker process started");
        Ok(WorkerHandle::attached(worker_id, language, child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_failure_surfaces_language() {
        let factory = ProcessWorkerFactory::new();
        let config = WorkerConfig::new("node", "/nonexistent/worker/executable");

        let err = factory
            .create("worker-1", "node", Path::new("/tmp"), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::SpawnFailed { ref language, .. } if language == "node"));
    }

    #[tokio::test]
    async fn test_spawn_real_process() {
        let factory = ProcessWorkerFactory::new();
        let config = WorkerConfig::new("shell", "/bin/sh").arg("-c").arg("sleep 30");

        let mut handle = factory
            .create("worker-1", "shell", Path::new("/tmp"), &config)
            .await
            .unwrap();
        assert!(handle.pid().is_some());
        handle.kill().await.unwrap();
    }

    #[test]
    fn test_detached_handle_has_no_pid() {
        let handle = WorkerHandle::detached("worker-1", "node");
        assert_eq!(handle.pid(), None);
    }
}
