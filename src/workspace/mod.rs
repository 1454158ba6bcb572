//! Workspace state: the shared store and per-batch snapshots.

mod snapshot;
mod store;

pub use snapshot::{Snapshot, select_manifest};
pub use store::{Content, WorkspaceStore};
