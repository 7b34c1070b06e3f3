//! Out-of-process language worker orchestration.

mod config;
mod launcher;
mod process;

pub use config::WorkerConfig;
pub use launcher::{WorkerLauncher, WorkerStartup};
pub use process::{ProcessWorkerFactory, WorkerHandle, WorkerProcessFactory};
