//! Supervised fire-and-forget worker startup.
//!
//! Worker creation runs in the background relative to host initialization:
//! the sequencer requests a worker and keeps going, but the outcome stays
//! observable through a [`WorkerStartup`] handle it (or a test) can await.

use crate::error::{HostError, WorkerError};
use crate::worker::config::WorkerConfig;
use crate::worker::process::{WorkerHandle, WorkerProcessFactory};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Requests worker creation per language and tracks startup outcomes.
pub struct WorkerLauncher {
    factory: Arc<dyn WorkerProcessFactory>,
    configs: HashMap<String, WorkerConfig>,
}

impl WorkerLauncher {
    /// Create a launcher over the given factory and per-language configs.
    pub fn new(factory: Arc<dyn WorkerProcessFactory>, configs: Vec<WorkerConfig>) -> Self {
        Self {
            factory,
            configs: configs
                .into_iter()
                .map(|c| (c.language.clone(), c))
                .collect(),
        }
    }

    /// Whether a worker config is registered for the language.
    pub fn supports(&self, language: &str) -> bool {
        self.configs.contains_key(&language.to_ascii_lowercase())
    }

    /// Request a worker for `language`, fire-and-forget. Returns a handle
    /// through which the spawn outcome can be awaited.
    pub fn launch(&self, language: &str, script_root: &Path) -> WorkerStartup {
        let language = language.to_ascii_lowercase();
        let worker_id = generate_worker_id();
        let (tx, rx) = oneshot::channel();

        match self.configs.get(&language).cloned() {
            Some(config) => {
                let factory = Arc::clone(&self.factory);
                let script_root: PathBuf = script_root.to_path_buf();
                let task_language = language.clone();
                let task_worker_id = worker_id.clone();
                tokio::spawn(async move {
                    let result = factory
                        .create(&task_worker_id, &task_language, &script_root, &config)
                        .await;
                    match &result {
                        Ok(handle) => info!(
                            worker_id = %handle.worker_id,
                            language = %task_language,
                            "worker created"
                        ),
                        Err(err) => error!(
                            language = %task_language,
                            error = %err,
                            "worker creation failed"
                        ),
                    }
                    // the receiver may have been dropped by a caller that
                    // chose not to observe the outcome
                    let _ = tx.send(result);
                });
            }
            None => {
                let _ = tx.send(Err(WorkerError::MissingConfig {
                    language: language.clone(),
                }));
            }
        }

        WorkerStartup {
            language,
            worker_id,
            receiver: rx,
        }
    }
}

/// Observable outcome of one worker startup request.
pub struct WorkerStartup {
    language: String,
    worker_id: String,
    receiver: oneshot::Receiver<Result<WorkerHandle, WorkerError>>,
}

impl WorkerStartup {
    /// Language the request was for.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Id assigned to the requested worker.
    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Wait for the startup outcome, observing cancellation.
    pub async fn wait(self, cancel: &CancellationToken) -> Result<WorkerHandle, HostError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(HostError::Cancelled),
            result = self.receiver => match result {
                Ok(outcome) => outcome.map_err(HostError::from),
                // the launch task panicked or was aborted
                Err(_) => Err(HostError::Worker(WorkerError::EarlyExit {
                    language: self.language,
                    status: -1,
                })),
            },
        }
    }
}

fn generate_worker_id() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{:x}", timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Factory that records calls and produces detached handles.
    struct RecordingFactory {
        calls: AtomicUsize,
        fail: bool,
    }

    impl RecordingFactory {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl WorkerProcessFactory for RecordingFactory {
        async fn create(
            &self,
            worker_id: &str,
            language: &str,
            _script_root: &Path,
            _config: &WorkerConfig,
        ) -> Result<WorkerHandle, WorkerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(WorkerError::SpawnFailed {
                    language: language.to_string(),
                    source: std::io::Error::other("boom"),
                })
            } else {
                Ok(WorkerHandle::detached(worker_id, language))
            }
        }
    }

    #[tokio::test]
    async fn test_launch_reports_success_through_handle() {
        let factory = RecordingFactory::new(false);
        let launcher = WorkerLauncher::new(
            factory.clone(),
            vec![WorkerConfig::new("node", "/usr/bin/node")],
        );

        let startup = launcher.launch("node", Path::new("/tmp"));
        assert_eq!(startup.language(), "node");

        let handle = startup.wait(&CancellationToken::new()).await.unwrap();
        assert_eq!(handle.language, "node");
        assert_eq!(factory.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_launch_reports_spawn_failure() {
        let factory = RecordingFactory::new(true);
        let launcher = WorkerLauncher::new(
            factory,
            vec![WorkerConfig::new("node", "/usr/bin/node")],
        );

        let startup = launcher.launch("node", Path::new("/tmp"));
        let err = startup.wait(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, HostError::Worker(WorkerError::SpawnFailed { .. })));
    }

    #[tokio::test]
    async fn test_launch_without_config_fails() {
        let factory = RecordingFactory::new(false);
        let launcher = WorkerLauncher::new(factory.clone(), Vec::new());
        assert!(!launcher.supports("python"));

        let startup = launcher.launch("python", Path::new("/tmp"));
        let err = startup.wait(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(
            err,
            HostError::Worker(WorkerError::MissingConfig { ref language }) if language == "python"
        ));
        assert_eq!(factory.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wait_observes_cancellation() {
        /// Factory that never completes.
        struct StallingFactory;

        #[async_trait]
        impl WorkerProcessFactory for StallingFactory {
            async fn create(
                &self,
                _worker_id: &str,
                _language: &str,
                _script_root: &Path,
                _config: &WorkerConfig,
            ) -> Result<WorkerHandle, WorkerError> {
                std::future::pending().await
            }
        }

        let launcher = WorkerLauncher::new(
            Arc::new(StallingFactory),
            vec![WorkerConfig::new("node", "/usr/bin/node")],
        );
        let startup = launcher.launch("node", Path::new("/tmp"));

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = startup.wait(&cancel).await.unwrap_err();
        assert!(matches!(err, HostError::Cancelled));
    }
}
