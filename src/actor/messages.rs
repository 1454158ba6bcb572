//! Actor Message Definitions
//!
//! ```text
//! Backend --SessionStart--> Dispatcher --PublishMsg--> PublisherActor --> client
//! ```

use std::path::PathBuf;

use crate::config::ServerConfig;
use crate::core::Diagnostic;

// =============================================================================
// Dispatcher Messages
// =============================================================================

/// Sent once by `initialize`; the dispatcher consumes no edits before it.
#[derive(Debug, Clone, Default)]
pub struct SessionStart {
    /// Workspace root (`rootUri`, else the first workspace folder).
    pub root: Option<PathBuf>,
    pub config: ServerConfig,
}

// =============================================================================
// PublisherActor Messages
// =============================================================================

/// Messages to the publisher actor.
#[derive(Debug)]
pub enum PublishMsg {
    /// Result of one completed per-file validation.
    Diagnostics {
        uri: String,
        diagnostics: Vec<Diagnostic>,
    },
    /// No more results will follow.
    Shutdown,
}
