//! Funchost - Example Host Binary
//!
//! Runs a function host over a small hand-built function app.

use funchost::prelude::*;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting function host...");

    let script_root = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./app".to_string());

    let mut store = MetadataStore::new();
    store.add(
        FunctionMetadata::new("hello")
            .with_language("node")
            .with_binding(BindingMetadata::new(
                BindingDirection::In,
                "httpTrigger",
                json!({ "route": "hello/{name}", "methods": ["get"] }),
            )),
    );
    store.add(
        FunctionMetadata::new("submit")
            .with_language("node")
            .with_binding(BindingMetadata::new(
                BindingDirection::In,
                "httpTrigger",
                json!({ "route": "orders", "methods": ["post"] }),
            )),
    );

    let config = HostConfig::new(&script_root)
        .worker(WorkerConfig::new("node", "/usr/bin/node").arg("worker.js"));

    let cancel = CancellationToken::new();
    let mut host = FunctionHost::new(config, store);
    host.initialize(&cancel).await?;

    tracing::info!(
        functions = host.runtime_state().descriptors().len(),
        runtime = host.resolved_runtime().unwrap_or("unknown"),
        "host initialized"
    );
    for descriptor in host.runtime_state().descriptors() {
        if let Some(trigger) = &descriptor.http_trigger {
            tracing::info!(function = %descriptor.name, route = %trigger.route, "registered");
        }
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");
    host.shutdown().await;
    Ok(())
}
