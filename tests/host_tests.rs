//! Integration tests for the function host lifecycle.

use funchost::debug::DEBUG_SENTINEL_MARKER;
use funchost::env::{settings, TestEnvironment};
use funchost::error::WorkerError;
use funchost::host::HostRuntimeState;
use funchost::prelude::*;
use funchost::telemetry::InMemoryMetrics;
use funchost::worker::WorkerProcessFactory;
use async_trait::async_trait;
use tokio_test::{assert_err, assert_ok};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

struct DetachedFactory;

#[async_trait]
impl WorkerProcessFactory for DetachedFactory {
    async fn create(
        &self,
        worker_id: &str,
        language: &str,
        _script_root: &Path,
        _config: &WorkerConfig,
    ) -> Result<WorkerHandle, WorkerError> {
        Ok(WorkerHandle::detached(worker_id, language))
    }
}

fn http_function(name: &str, language: &str, route: &str, methods: &[&str]) -> FunctionMetadata {
    FunctionMetadata::new(name)
        .with_language(language)
        .with_binding(BindingMetadata::new(
            BindingDirection::In,
            "httpTrigger",
            json!({ "route": route, "methods": methods }),
        ))
}

fn build_host(
    functions: Vec<FunctionMetadata>,
    env: Arc<TestEnvironment>,
    metrics: Arc<InMemoryMetrics>,
    root: &Path,
) -> FunctionHost {
    let config = HostConfig::new(root)
        .cold_start_delay(Duration::from_millis(50))
        .worker(WorkerConfig::new("node", "/usr/bin/node"));
    FunctionHost::with_collaborators(
        config,
        MetadataStore::from_functions(functions),
        env,
        Arc::new(DetachedFactory),
        metrics,
    )
}

#[tokio::test]
async fn full_startup_with_mixed_outcomes() {
    let root = tempfile::tempdir().unwrap();
    let env = Arc::new(TestEnvironment::new());
    env.set(settings::FUNCTIONS_WORKER_RUNTIME, "node");
    let metrics = Arc::new(InMemoryMetrics::new());

    let functions = vec![
        http_function("products", "node", "products/{category}/{id}", &["get"]),
        // conflicts with the first registration: same shape, same method
        http_function("productsAlias", "node", "products/{a}/{b}", &["get"]),
        // same shape but disjoint methods, no conflict
        http_function("productsPost", "node", "products/{category}/{id}", &["post"]),
        // reserved prefix
        http_function("adminTool", "node", "admin/tool", &["get"]),
        // empty route defaults to the function name
        http_function("status", "node", "", &["get"]),
        // invalid name, recorded and skipped
        http_function("bad name", "node", "whatever", &["get"]),
        // no http trigger: passes validation, not registered
        FunctionMetadata::new("timer").with_language("node"),
    ];

    let mut host = build_host(functions, env, metrics.clone(), root.path());
    tokio_test::assert_ok!(host.initialize(&CancellationToken::new()).await);

    assert_eq!(host.state(), HostState::Running);
    assert!(host.registry().contains("products"));
    assert!(!host.registry().contains("productsAlias"));
    assert!(host.registry().contains("productsPost"));
    assert!(!host.registry().contains("adminTool"));
    assert!(host.registry().contains("status"));
    assert_eq!(host.registry().get("status").unwrap().route, "status");

    let state: &HostRuntimeState = host.runtime_state();
    assert_eq!(
        state.function_errors().get("productsAlias").unwrap(),
        &vec![
            "The route specified conflicts with the route defined by function 'products'."
                .to_string()
        ]
    );
    assert_eq!(
        state.function_errors().get("adminTool").unwrap(),
        &vec!["The specified route conflicts with one or more built in routes.".to_string()]
    );
    assert_eq!(
        state.function_errors().get("bad name").unwrap(),
        &vec!["'bad name' is not a valid function name.".to_string()]
    );

    // timer passed validation without being registered for HTTP
    assert!(state.is_function("timer"));
    assert!(!host.registry().contains("timer"));

    assert_eq!(metrics.events(), vec!["host.startup.runtime.language.node"]);
    assert!(host.worker().is_some());

    host.shutdown().await;
    assert_eq!(host.state(), HostState::Offline);
}

#[tokio::test]
async fn duplicate_names_keep_first_registration() {
    let root = tempfile::tempdir().unwrap();
    let env = Arc::new(TestEnvironment::new());
    env.set(settings::FUNCTIONS_WORKER_RUNTIME, "node");
    let metrics = Arc::new(InMemoryMetrics::new());

    let functions = vec![
        http_function("func1", "node", "route1", &["get"]),
        http_function("func1", "node", "route2", &["get"]),
    ];

    let mut host = build_host(functions, env, metrics, root.path());
    host.initialize(&CancellationToken::new()).await.unwrap();

    assert_eq!(host.registry().get("func1").unwrap().route, "route1");
    assert_eq!(
        host.runtime_state().function_errors().get("func1").unwrap(),
        &vec![
            "The function or proxy name 'func1' must be unique within the function app."
                .to_string()
        ]
    );
}

#[tokio::test]
async fn proxies_share_the_name_space_with_functions() {
    let root = tempfile::tempdir().unwrap();
    let env = Arc::new(TestEnvironment::new());
    env.set(settings::FUNCTIONS_WORKER_RUNTIME, "node");
    let metrics = Arc::new(InMemoryMetrics::new());

    let mut proxy = FunctionMetadata::proxy("my proxy %");
    proxy.bindings.push(BindingMetadata::new(
        BindingDirection::In,
        "httpTrigger",
        json!({ "route": "proxied" }),
    ));
    assert_eq!(proxy.name, "myproxy");

    let functions = vec![
        proxy,
        http_function("myproxy", "node", "other", &["get"]),
    ];

    let mut host = build_host(functions, env, metrics, root.path());
    host.initialize(&CancellationToken::new()).await.unwrap();

    assert!(host.registry().contains("myproxy"));
    assert_eq!(host.registry().get("myproxy").unwrap().route, "proxied");
    assert_eq!(
        host.runtime_state().function_errors().get("myproxy").unwrap(),
        &vec![
            "The function or proxy name 'myproxy' must be unique within the function app."
                .to_string()
        ]
    );
}

#[tokio::test]
async fn debug_notification_round_trip() {
    let root = tempfile::tempdir().unwrap();
    let env = Arc::new(TestEnvironment::new());
    env.set(settings::FUNCTIONS_WORKER_RUNTIME, "node");
    let metrics = Arc::new(InMemoryMetrics::new());

    let mut host = build_host(
        vec![http_function("func1", "node", "", &["get"])],
        env,
        metrics,
        root.path(),
    );
    host.initialize(&CancellationToken::new()).await.unwrap();

    // DebugOnly is the default file logging mode
    assert_eq!(host.file_logging().mode(), FileLoggingMode::DebugOnly);
    assert!(!host.file_logging().is_enabled());

    host.debug_manager().notify_debug();
    assert!(host.debug_manager().state().in_debug_mode());
    assert!(host.file_logging().is_enabled());

    let sentinel = host.debug_manager().sentinel_path();
    assert_eq!(
        std::fs::read_to_string(sentinel).unwrap(),
        DEBUG_SENTINEL_MARKER
    );

    host.file_logging().set_mode(FileLoggingMode::Never);
    assert!(!host.file_logging().is_enabled());

    host.shutdown().await;
}

#[tokio::test]
async fn mixed_language_app_fails_before_registration() {
    let root = tempfile::tempdir().unwrap();
    let env = Arc::new(TestEnvironment::new());
    let metrics = Arc::new(InMemoryMetrics::new());

    let functions = vec![
        http_function("funcJs", "node", "a", &["get"]),
        http_function("funcPy", "python", "b", &["get"]),
    ];

    let mut host = build_host(functions, env, metrics.clone(), root.path());
    let err = tokio_test::assert_err!(host.initialize(&CancellationToken::new()).await);

    assert_eq!(host.state(), HostState::Error);
    assert_eq!(
        err.to_string(),
        "Found functions with more than one language. Select a language for your function app \
         by specifying FUNCTIONS_WORKER_RUNTIME AppSetting"
    );
    assert!(host.registry().is_empty());
    assert!(metrics.events().is_empty());
}

#[tokio::test]
async fn explicit_runtime_without_matching_functions_fails() {
    let root = tempfile::tempdir().unwrap();
    let env = Arc::new(TestEnvironment::new());
    env.set(settings::FUNCTIONS_WORKER_RUNTIME, "dotnet");
    let metrics = Arc::new(InMemoryMetrics::new());

    let mut host = build_host(
        vec![http_function("funcJs", "node", "a", &["get"])],
        env,
        metrics,
        root.path(),
    );
    let err = host.initialize(&CancellationToken::new()).await.unwrap_err();
    assert_eq!(err.to_string(), "Did not find functions with language [dotnet].");
}
