//! Host initialization sequencing.
//!
//! The host moves through a fixed startup pipeline: platform gates, metadata
//! validation, language resolution, route registration, telemetry, worker
//! startup. Per-function problems are recorded and skipped so the rest of
//! the app still starts; fatal conditions abort to the `Error` state.

use crate::debug::{DebugManager, DebugState, FileLoggingState};
use crate::env::{settings, Environment, SystemEnvironment};
use crate::error::HostError;
use crate::host::config::HostConfig;
use crate::language;
use crate::metadata::{is_valid_function_name, FunctionDescriptor, FunctionMetadata, MetadataStore};
use crate::routing::{HttpTrigger, RouteRegistry};
use crate::telemetry::{runtime_stack_event, MetricsLogger, TracingMetrics};
use crate::worker::{ProcessWorkerFactory, WorkerHandle, WorkerLauncher, WorkerProcessFactory};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Lifecycle state of a [`FunctionHost`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostState {
    /// Created, not yet initialized.
    #[default]
    Offline,
    /// Initialization in progress.
    Initializing,
    /// Initialization completed, functions are served.
    Running,
    /// Initialization failed fatally.
    Error,
}

/// Mutable outcome of initialization: the registered functions plus the
/// per-function errors collected along the way.
#[derive(Debug, Default)]
pub struct HostRuntimeState {
    descriptors: Vec<FunctionDescriptor>,
    function_errors: BTreeMap<String, Vec<String>>,
}

impl HostRuntimeState {
    /// Successfully registered functions, in registration order.
    pub fn descriptors(&self) -> &[FunctionDescriptor] {
        &self.descriptors
    }

    /// Per-function error messages, keyed by function name. Append-only.
    pub fn function_errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.function_errors
    }

    /// Record an error against a function. Existing entries are never
    /// replaced, only appended to.
    pub fn add_function_error(&mut self, function: impl Into<String>, message: impl Into<String>) {
        self.function_errors
            .entry(function.into())
            .or_default()
            .push(message.into());
    }

    /// Whether the name refers to a known function: either registered, or
    /// one that failed with recorded errors.
    pub fn is_function(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        self.descriptors
            .iter()
            .any(|d| d.name.eq_ignore_ascii_case(name))
            || self
                .function_errors
                .keys()
                .any(|n| n.eq_ignore_ascii_case(name))
    }

    fn add_descriptor(&mut self, descriptor: FunctionDescriptor) {
        self.descriptors.push(descriptor);
    }
}

/// The function host: owns the metadata store, route registry, debug
/// machinery and worker orchestration for one function app.
pub struct FunctionHost {
    config: HostConfig,
    store: MetadataStore,
    env: Arc<dyn Environment>,
    metrics: Arc<dyn MetricsLogger>,
    launcher: WorkerLauncher,
    state: HostState,
    runtime_state: HostRuntimeState,
    registry: RouteRegistry,
    debug_manager: DebugManager,
    file_logging: FileLoggingState,
    resolved_runtime: Option<String>,
    worker: Option<WorkerHandle>,
    shutdown: CancellationToken,
}

impl FunctionHost {
    /// Create a host over the given configuration and discovered metadata,
    /// using the process environment and real worker processes.
    pub fn new(config: HostConfig, store: MetadataStore) -> Self {
        Self::with_collaborators(
            config,
            store,
            Arc::new(SystemEnvironment::new()),
            Arc::new(ProcessWorkerFactory::new()),
            Arc::new(TracingMetrics::new()),
        )
    }

    /// Create a host with explicit collaborators. Tests substitute an
    /// in-memory environment, a stub worker factory and a capturing
    /// metrics sink.
    pub fn with_collaborators(
        config: HostConfig,
        store: MetadataStore,
        env: Arc<dyn Environment>,
        factory: Arc<dyn WorkerProcessFactory>,
        metrics: Arc<dyn MetricsLogger>,
    ) -> Self {
        let debug_state = Arc::new(DebugState::new());
        // the platform's log path wins over the configured default
        let log_root = env
            .log_path()
            .map(PathBuf::from)
            .unwrap_or_else(|| config.log_root_path.clone());
        let debug_manager = DebugManager::new(Arc::clone(&debug_state), log_root);
        let file_logging = FileLoggingState::new(config.file_logging_mode, debug_state);
        let launcher = WorkerLauncher::new(factory, config.workers.clone());

        Self {
            config,
            store,
            env,
            metrics,
            launcher,
            state: HostState::default(),
            runtime_state: HostRuntimeState::default(),
            registry: RouteRegistry::new(),
            debug_manager,
            file_logging,
            resolved_runtime: None,
            worker: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HostState {
        self.state
    }

    /// Registered functions and per-function errors.
    pub fn runtime_state(&self) -> &HostRuntimeState {
        &self.runtime_state
    }

    /// The HTTP route registry.
    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Debug notification manager.
    pub fn debug_manager(&self) -> &DebugManager {
        &self.debug_manager
    }

    /// File logging controller.
    pub fn file_logging(&self) -> &FileLoggingState {
        &self.file_logging
    }

    /// The runtime language resolved during initialization.
    pub fn resolved_runtime(&self) -> Option<&str> {
        self.resolved_runtime.as_deref()
    }

    /// Handle of the language worker, once one has started.
    pub fn worker(&self) -> Option<&WorkerHandle> {
        self.worker.as_ref()
    }

    /// Run the initialization pipeline. Valid only from `Offline`; leaves
    /// the host `Running` on success and `Error` on any fatal condition.
    pub async fn initialize(&mut self, cancel: &CancellationToken) -> Result<(), HostError> {
        if self.state != HostState::Offline {
            return Err(HostError::InvalidArgument(format!(
                "host cannot be initialized from the {:?} state",
                self.state
            )));
        }
        self.state = HostState::Initializing;
        info!(
            script_root = %self.config.script_root_path.display(),
            "initializing function host"
        );

        match self.run_initialization(cancel).await {
            Ok(()) => {
                self.state = HostState::Running;
                info!(
                    functions = self.runtime_state.descriptors().len(),
                    errors = self.runtime_state.function_errors().len(),
                    "function host running"
                );
                Ok(())
            }
            Err(err) => {
                self.state = HostState::Error;
                Err(err)
            }
        }
    }

    async fn run_initialization(&mut self, cancel: &CancellationToken) -> Result<(), HostError> {
        if cancel.is_cancelled() {
            return Err(HostError::Cancelled);
        }

        self.verify_extension_version()?;

        // Invalid names become per-function errors; the rest of the app
        // keeps initializing.
        let discovered = self.store.functions().to_vec();
        let mut valid = Vec::new();
        for metadata in discovered {
            if is_valid_function_name(&metadata.name) {
                valid.push(metadata);
            } else {
                self.record_function_error(HostError::function_config(
                    metadata.name.clone(),
                    format!("'{}' is not a valid function name.", metadata.name),
                ));
            }
        }

        let worker_runtime = self.env.worker_runtime();
        language::verify_functions_match_language(
            &valid,
            worker_runtime.as_deref(),
            self.env.is_placeholder_mode(),
            self.config.http_worker,
            cancel,
        )?;

        let runtime = worker_runtime
            .as_deref()
            .map(language::alias_language)
            .or_else(|| language::worker_runtime_from_metadata(&valid))
            .unwrap_or_else(|| language::DOTNET_LANGUAGE.to_string());
        info!(runtime = %runtime, "resolved worker runtime");
        self.resolved_runtime = Some(runtime.clone());

        for metadata in valid.iter() {
            let mut descriptor = FunctionDescriptor::new(metadata.name.clone(), metadata.clone());
            if let Some(binding) = metadata.http_trigger_binding() {
                descriptor = descriptor.with_http_trigger(HttpTrigger::from_binding(binding));
            }

            match self.registry.register(&mut descriptor, self.env.as_ref()) {
                Ok(()) => self.runtime_state.add_descriptor(descriptor),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    self.record_function_error(HostError::function_config(
                        metadata.name.clone(),
                        err.to_string(),
                    ));
                }
            }
        }

        self.metrics.log_event(&runtime_stack_event(
            &runtime,
            self.env.worker_runtime_version().as_deref(),
        ));

        let watch_delay = if self.env.is_dynamic_sku() {
            self.config.cold_start_delay
        } else {
            Duration::ZERO
        };
        self.debug_manager
            .spawn_sentinel_watcher(watch_delay, self.shutdown.clone());

        self.start_worker(&runtime, &valid, cancel).await
    }

    /// Record a recoverable per-function error against its function. Other
    /// error kinds do not belong in the per-function map.
    fn record_function_error(&mut self, err: HostError) {
        if let HostError::FunctionConfig { function, message } = err {
            warn!(function = %function, error = %message, "function failed validation");
            self.runtime_state.add_function_error(function, message);
        }
    }

    /// The platform refuses to run without a pinned site extension version;
    /// self-hosted deployments (no instance id) are exempt.
    fn verify_extension_version(&self) -> Result<(), HostError> {
        if !self.env.is_azure_environment() {
            return Ok(());
        }
        match self
            .env
            .get_non_empty(settings::FUNCTIONS_EXTENSION_VERSION)
        {
            None => Err(HostError::Initialization(format!(
                "Invalid site extension version. The {} app setting must be set to a valid version.",
                settings::FUNCTIONS_EXTENSION_VERSION
            ))),
            Some(version) if version.eq_ignore_ascii_case("latest") => {
                warn!(
                    "Site extension version currently set to 'latest'. Pin {} to a specific major version.",
                    settings::FUNCTIONS_EXTENSION_VERSION
                );
                Ok(())
            }
            Some(_) => Ok(()),
        }
    }

    /// Request the language worker. In-process dotnet needs no worker, and
    /// placeholder hosts defer worker startup to specialization. Startup
    /// failure is fatal only when the language actually has functions.
    async fn start_worker(
        &mut self,
        runtime: &str,
        functions: &[FunctionMetadata],
        cancel: &CancellationToken,
    ) -> Result<(), HostError> {
        if runtime == language::DOTNET_LANGUAGE
            || self.env.is_placeholder_mode()
            || self.config.http_worker
        {
            return Ok(());
        }

        let startup = self
            .launcher
            .launch(runtime, &self.config.script_root_path);

        let has_functions = language::contains_function_matching_runtime(functions, runtime);
        if has_functions {
            let handle = startup.wait(cancel).await?;
            self.worker = Some(handle);
        } else {
            // prewarm attempt; the outcome is logged by the launch task
            drop(startup);
        }
        Ok(())
    }

    /// Stop background tasks and terminate the worker process.
    pub async fn shutdown(&mut self) {
        self.shutdown.cancel();
        if let Some(worker) = self.worker.as_mut() {
            if let Err(err) = worker.kill().await {
                warn!(error = %err, "failed to terminate worker process");
            }
        }
        self.state = HostState::Offline;
    }
}
