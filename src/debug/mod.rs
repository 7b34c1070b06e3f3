//! Debug-mode state machine and the file-logging controller.

mod logging;
mod manager;
mod state;

pub use logging::{FileLoggingMode, FileLoggingState};
pub use manager::{DebugManager, DEBUG_SENTINEL_FILE_NAME, DEBUG_SENTINEL_MARKER};
pub use state::{DebugState, DEBUG_MODE_TIMEOUT};
