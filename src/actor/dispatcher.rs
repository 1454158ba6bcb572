//! Validation Dispatcher
//!
//! Drives one batch at a time:
//!
//! ```text
//! idle -> detecting -> [widening] -> snapshotting -> dispatching -> collecting -> idle
//! ```
//!
//! Each file of a batch is validated on the blocking pool against one shared
//! snapshot. Results go to the publisher as soon as each task finishes; the
//! next batch only starts after every task of this one has been collected.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinSet};

use super::debouncer::{Batch, EditReceiver};
use super::messages::{PublishMsg, SessionStart};
use crate::config::AccessibilityLevel;
use crate::core::{Diagnostic, FileKind};
use crate::validator::Registry;
use crate::workspace::{Snapshot, WorkspaceStore};
use crate::{debug, log};

/// Per-session settings resolved from `initialize`.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub root: Option<PathBuf>,
    pub accessibility: AccessibilityLevel,
    /// Quiet period between a signal and the drain.
    pub debounce: Option<Duration>,
    pub task_timeout: Option<Duration>,
}

impl From<SessionStart> for Session {
    fn from(start: SessionStart) -> Self {
        Self {
            root: start.root,
            accessibility: start.config.accessibility.severity,
            debounce: start.config.validation.debounce(),
            task_timeout: start.config.validation.task_timeout(),
        }
    }
}

/// Why a per-file task published nothing.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("validation timed out after {0:?}")]
    TimedOut(Duration),
    #[error("validation task failed: {0}")]
    Join(#[from] JoinError),
}

pub struct Dispatcher {
    store: Arc<WorkspaceStore>,
    registry: Arc<Registry>,
    publish_tx: mpsc::Sender<PublishMsg>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<WorkspaceStore>,
        registry: Arc<Registry>,
        publish_tx: mpsc::Sender<PublishMsg>,
    ) -> Self {
        Self {
            store,
            registry,
            publish_tx,
        }
    }

    /// Wait for the session, then validate batches until the queue closes.
    pub async fn run(self, start: oneshot::Receiver<SessionStart>, mut edits: EditReceiver) {
        let session = match start.await {
            Ok(start) => Session::from(start),
            Err(_) => {
                debug!("dispatch"; "session never started");
                return;
            }
        };
        debug!("dispatch"; "session started, root: {:?}", session.root);

        while let Some(batch) = edits.next_batch(session.debounce).await {
            self.run_batch(batch, &session).await;
        }

        debug!("dispatch"; "edit queue closed");
        let _ = self.publish_tx.send(PublishMsg::Shutdown).await;
    }

    /// Validate one drained batch; returns the number of published results.
    pub async fn run_batch(&self, batch: Batch, session: &Session) -> usize {
        // detecting
        let mut widen = false;
        let mut uris = Vec::with_capacity(batch.len());
        for (uri, content) in batch {
            if !FileKind::is_target(&uri) {
                debug!("dispatch"; "skip {}", uri);
                continue;
            }
            widen |= self.store.update(&uri, content) == FileKind::Manifest;
            uris.push(uri);
        }
        if uris.is_empty() {
            return 0;
        }

        // widening
        if widen {
            uris = self.store.uris();
            debug!("dispatch"; "manifest changed, revalidating {} files", uris.len());
        }

        // snapshotting
        let snapshot = Arc::new(Snapshot::capture(
            &self.store,
            session.root.clone(),
            session.accessibility,
        ));

        // dispatching
        let mut tasks = JoinSet::new();
        for uri in uris {
            let Some(content) = snapshot.files.get(&uri).cloned() else {
                continue;
            };
            let kind = snapshot.kind(&uri);
            let registry = Arc::clone(&self.registry);
            let snapshot = Arc::clone(&snapshot);
            let limit = session.task_timeout;

            tasks.spawn(async move {
                let task_uri = uri.clone();
                let work = tokio::task::spawn_blocking(move || {
                    registry.validate_file(&task_uri, &content, kind, Some(snapshot.as_ref()))
                });
                (uri, await_validation(work, limit).await)
            });
        }

        // collecting
        let mut published = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((uri, Ok(diagnostics))) => {
                    debug!("dispatch"; "{}: {} diagnostics", uri, diagnostics.len());
                    let msg = PublishMsg::Diagnostics { uri, diagnostics };
                    if self.publish_tx.send(msg).await.is_err() {
                        log!("error"; "publisher stopped, dropping results");
                        break;
                    }
                    published += 1;
                }
                Ok((uri, Err(err))) => log!("dispatch"; "{}: {}", uri, err),
                Err(err) => log!("error"; "validation task failed: {}", err),
            }
        }

        // Barrier: remaining tasks are finished before the next batch.
        while tasks.join_next().await.is_some() {}
        published
    }
}

async fn await_validation(
    work: tokio::task::JoinHandle<Vec<Diagnostic>>,
    limit: Option<Duration>,
) -> Result<Vec<Diagnostic>, TaskError> {
    match limit {
        Some(limit) => match tokio::time::timeout(limit, work).await {
            Ok(joined) => Ok(joined?),
            Err(_) => Err(TaskError::TimedOut(limit)),
        },
        None => Ok(work.await?),
    }
}
