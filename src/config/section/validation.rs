//! `[validation]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [validation]
//! debounce_ms = 0             # quiet period before draining pending edits
//! task_timeout_ms = 0         # per-file validation timeout (0 = disabled)
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Upper bound accepted for `debounce_ms`.
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Quiet period after an edit signal before the batch is drained.
    pub debounce_ms: u64,

    /// Per-file validation timeout in milliseconds, 0 disables.
    pub task_timeout_ms: u64,
}

impl ValidationConfig {
    pub fn debounce(&self) -> Option<Duration> {
        (self.debounce_ms > 0).then(|| Duration::from_millis(self.debounce_ms))
    }

    pub fn task_timeout(&self) -> Option<Duration> {
        (self.task_timeout_ms > 0).then(|| Duration::from_millis(self.task_timeout_ms))
    }
}
