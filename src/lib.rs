//! # Funchost - Multi-Language Function Execution Host
//!
//! Funchost is the core of a serverless function host: it takes the
//! metadata of discovered functions, resolves the single worker runtime
//! language serving the app, validates and registers HTTP routes, and
//! supervises the out-of-process language worker.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Function App Platform                        │
//! │               (deployment, scaling, HTTP frontend)                  │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                   │
//!                                   ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Function Host                              │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐  │
//! │  │   Metadata   │─▶│   Language   │─▶│      Route Registry      │  │
//! │  │    Store     │  │   Resolver   │  │  (conflict detection)    │  │
//! │  └──────────────┘  └──────────────┘  └──────────────────────────┘  │
//! │  ┌──────────────┐  ┌──────────────────────────────────────────┐    │
//! │  │ Debug State  │  │            Worker Launcher               │    │
//! │  │  + Sentinel  │  │   (one process per runtime language)     │    │
//! │  └──────────────┘  └──────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use funchost::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), HostError> {
//!     let mut store = MetadataStore::new();
//!     store.add(
//!         FunctionMetadata::new("hello")
//!             .with_language("node")
//!             .with_binding(BindingMetadata::new(
//!                 BindingDirection::In,
//!                 "httpTrigger",
//!                 json!({ "route": "hello/{name}", "methods": ["get"] }),
//!             )),
//!     );
//!
//!     let config = HostConfig::new("/home/site/wwwroot")
//!         .worker(WorkerConfig::new("node", "/usr/bin/node").arg("worker.js"));
//!
//!     let mut host = FunctionHost::new(config, store);
//!     host.initialize(&CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Initialization Pipeline
//!
//! 1. **Platform gates**: site extension version checks.
//! 2. **Validation**: function names; invalid functions are recorded and
//!    skipped, the rest of the app still starts.
//! 3. **Language resolution**: a function app is served by exactly one
//!    worker language; mixed-language apps fail fast.
//! 4. **Registration**: HTTP routes are defaulted, reserved prefixes
//!    rejected, and overlapping routes detected (first registered wins).
//! 5. **Worker startup**: one supervised worker process for the resolved
//!    language; in-process runtimes need none.

pub mod debug;
pub mod env;
pub mod error;
pub mod host;
pub mod language;
pub mod metadata;
pub mod routing;
pub mod telemetry;
pub mod worker;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::debug::{DebugManager, FileLoggingMode, FileLoggingState};
    pub use crate::env::{Environment, SystemEnvironment, TestEnvironment};
    pub use crate::error::{HostError, WorkerError};
    pub use crate::host::{FunctionHost, HostConfig, HostState};
    pub use crate::metadata::{
        BindingDirection, BindingMetadata, FunctionMetadata, MetadataStore,
    };
    pub use crate::routing::{AuthLevel, HttpTrigger, RouteRegistry};
    pub use crate::worker::{WorkerConfig, WorkerHandle};
    pub use tokio_util::sync::CancellationToken;
}

// Re-export for convenience
pub use error::{HostError, WorkerError};
pub use host::{FunctionHost, HostConfig, HostState};
pub use metadata::{FunctionMetadata, MetadataStore};
