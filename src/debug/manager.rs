//! Debug notifications and the sentinel-file watcher.

use crate::debug::state::DebugState;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// File name of the debug sentinel under `<log-root>/Host/`.
pub const DEBUG_SENTINEL_FILE_NAME: &str = "debug_sentinel";

/// Fixed marker text written to the sentinel. Only the file's modification
/// time is load-bearing; the content is never parsed.
pub const DEBUG_SENTINEL_MARKER: &str =
    "This is a system managed marker file used to control runtime debug mode behavior.";

/// Poll interval for sentinel modification checks.
const WATCH_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Issues debug notifications and watches the sentinel file for external
/// touches.
#[derive(Debug)]
pub struct DebugManager {
    state: Arc<DebugState>,
    sentinel_path: PathBuf,
}

impl DebugManager {
    /// Create a manager for the given log root. The sentinel lives at
    /// `<log_root>/Host/debug_sentinel`.
    pub fn new(state: Arc<DebugState>, log_root: impl AsRef<Path>) -> Self {
        Self {
            state,
            sentinel_path: log_root
                .as_ref()
                .join("Host")
                .join(DEBUG_SENTINEL_FILE_NAME),
        }
    }

    /// The sentinel file path.
    pub fn sentinel_path(&self) -> &Path {
        &self.sentinel_path
    }

    /// The shared debug state.
    pub fn state(&self) -> &Arc<DebugState> {
        &self.state
    }

    /// Record a debug notification and touch the sentinel file.
    ///
    /// The in-memory timestamp is always updated first; sentinel write
    /// failures are logged and swallowed so debug mode stays correct on a
    /// read-only filesystem.
    pub fn notify_debug(&self) {
        self.state.notify();

        if let Err(err) = self.write_sentinel() {
            warn!(
                path = %self.sentinel_path.display(),
                error = %err,
                "unable to update debug sentinel file"
            );
        }
    }

    fn write_sentinel(&self) -> std::io::Result<()> {
        if let Some(dir) = self.sentinel_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.sentinel_path, DEBUG_SENTINEL_MARKER)
    }

    /// Start the background watcher that mirrors external sentinel touches
    /// into debug state.
    ///
    /// `startup_delay` defers the watch after cold start (non-zero on
    /// elastic/dynamic hosting tiers, where early watching is wasted work).
    /// The task runs until the token is cancelled.
    pub fn spawn_sentinel_watcher(
        &self,
        startup_delay: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let path = self.sentinel_path.clone();

        tokio::spawn(async move {
            if !startup_delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(startup_delay) => {}
                }
            }

            let mut last_seen = sentinel_mtime(&path);
            info!("Debug file watch initialized.");

            let mut interval = tokio::time::interval(WATCH_POLL_INTERVAL);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        let current = sentinel_mtime(&path);
                        if let Some(mtime) = current {
                            let changed = last_seen.is_none_or(|seen| mtime > seen);
                            if changed {
                                debug!(path = %path.display(), "debug sentinel modified");
                                state.notify();
                            }
                        }
                        last_seen = current.or(last_seen);
                    }
                }
            }
        })
    }
}

fn sentinel_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
