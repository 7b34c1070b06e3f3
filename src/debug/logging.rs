//! File-logging state derived from configuration and debug mode.

use crate::debug::state::DebugState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::RwLock;

/// When verbose file logging is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileLoggingMode {
    /// Never write file logs.
    Never,
    /// Always write file logs.
    Always,
    /// Write file logs only while the host is in debug mode.
    #[default]
    DebugOnly,
}

/// Derives whether file logging is enabled from the configured mode and the
/// current debug state. Re-evaluated on every read, since debug mode is
/// itself time-derived.
#[derive(Debug)]
pub struct FileLoggingState {
    mode: RwLock<FileLoggingMode>,
    debug_state: Arc<DebugState>,
}

impl FileLoggingState {
    /// Create a controller for the given mode and debug state.
    pub fn new(mode: FileLoggingMode, debug_state: Arc<DebugState>) -> Self {
        Self {
            mode: RwLock::new(mode),
            debug_state,
        }
    }

    /// The configured mode.
    pub fn mode(&self) -> FileLoggingMode {
        *self.mode.read().expect("file logging mode lock poisoned")
    }

    /// Change the configured mode.
    pub fn set_mode(&self, mode: FileLoggingMode) {
        *self.mode.write().expect("file logging mode lock poisoned") = mode;
    }

    /// Whether file logging is currently enabled.
    pub fn is_enabled(&self) -> bool {
        match self.mode() {
            FileLoggingMode::Never => false,
            FileLoggingMode::Always => true,
            FileLoggingMode::DebugOnly => self.debug_state.in_debug_mode(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_logging_follows_mode_and_debug_state() {
        let debug_state = Arc::new(DebugState::new());
        let logging = FileLoggingState::new(FileLoggingMode::DebugOnly, Arc::clone(&debug_state));

        assert!(!logging.is_enabled());
        debug_state.notify();
        assert!(logging.is_enabled());

        logging.set_mode(FileLoggingMode::Never);
        assert!(!logging.is_enabled());

        logging.set_mode(FileLoggingMode::Always);
        assert!(logging.is_enabled());
        debug_state.clear();
        assert!(logging.is_enabled());
    }
}
