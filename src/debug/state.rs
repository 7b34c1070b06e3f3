//! Debug-mode state derived from a single notification timestamp.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// How long the host stays in debug mode after the last notification.
pub const DEBUG_MODE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Sentinel value meaning "never notified".
const NEVER: i64 = i64::MIN;

/// Process-wide-looking but explicitly owned debug state: one atomically
/// replaced timestamp, read from watcher and request paths concurrently.
/// Each host instance owns its own handle.
#[derive(Debug)]
pub struct DebugState {
    last_debug_notify_ms: AtomicI64,
}

impl DebugState {
    /// Create state that has never been notified.
    pub fn new() -> Self {
        Self {
            last_debug_notify_ms: AtomicI64::new(NEVER),
        }
    }

    /// Record a debug notification at the current time.
    pub fn notify(&self) {
        self.last_debug_notify_ms
            .store(now_epoch_ms(), Ordering::SeqCst);
    }

    /// Reset to the never-notified state.
    pub fn clear(&self) {
        self.last_debug_notify_ms.store(NEVER, Ordering::SeqCst);
    }

    /// The last notification time in epoch milliseconds, if any.
    pub fn last_debug_notify_ms(&self) -> Option<i64> {
        match self.last_debug_notify_ms.load(Ordering::SeqCst) {
            NEVER => None,
            ms => Some(ms),
        }
    }

    /// Backdate the notification timestamp by the given duration. Intended
    /// for tests exercising the timeout boundary.
    pub fn set_notified_ago(&self, elapsed: Duration) {
        let ms = now_epoch_ms() - elapsed.as_millis() as i64;
        self.last_debug_notify_ms.store(ms, Ordering::SeqCst);
    }

    /// Whether the host is currently in debug mode. True strictly within
    /// the timeout window; false at the exact boundary.
    pub fn in_debug_mode(&self) -> bool {
        match self.last_debug_notify_ms() {
            None => false,
            Some(last) => now_epoch_ms() - last < DEBUG_MODE_TIMEOUT.as_millis() as i64,
        }
    }
}

impl Default for DebugState {
    fn default() -> Self {
        Self::new()
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_notified_is_not_debugging() {
        let state = DebugState::new();
        assert_eq!(state.last_debug_notify_ms(), None);
        assert!(!state.in_debug_mode());
    }

    #[test]
    fn test_in_debug_mode_expected_values() {
        let state = DebugState::new();

        // exactly at the timeout boundary: not debugging
        state.set_notified_ago(DEBUG_MODE_TIMEOUT);
        assert!(!state.in_debug_mode());

        // one minute inside the window: debugging
        state.set_notified_ago(DEBUG_MODE_TIMEOUT - Duration::from_secs(60));
        assert!(state.in_debug_mode());

        // one minute past the window: not debugging
        state.set_notified_ago(DEBUG_MODE_TIMEOUT + Duration::from_secs(60));
        assert!(!state.in_debug_mode());
    }

    #[test]
    fn test_notify_enters_debug_mode() {
        let state = DebugState::new();
        state.notify();
        assert!(state.in_debug_mode());

        state.clear();
        assert!(!state.in_debug_mode());
    }
}
