//! Host lifecycle: configuration and the initialization sequencer.

mod config;
mod sequencer;

pub use config::HostConfig;
pub use sequencer::{FunctionHost, HostRuntimeState, HostState};
