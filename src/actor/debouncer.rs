//! Edit queue with a single-slot wake-up signal.
//!
//! Producers overwrite the latest content per URI and post a signal only if
//! none is pending. The consumer wakes on the signal, drains the whole map
//! and swallows signals that raced in, all under one lock, so a burst of
//! edits collapses into one batch and no edit is lost.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use crate::workspace::Content;

/// URI → latest content, drained as one validation batch.
pub type Batch = FxHashMap<String, Content>;

/// Producer side, shared by the protocol handlers.
#[derive(Debug)]
pub struct EditQueue {
    pending: Mutex<Batch>,
    signal: mpsc::Sender<()>,
    closed: AtomicBool,
}

/// Consumer side, owned by the dispatcher loop.
#[derive(Debug)]
pub struct EditReceiver {
    queue: Arc<EditQueue>,
    signal: mpsc::Receiver<()>,
}

/// Create a connected queue/receiver pair.
pub fn edit_queue() -> (Arc<EditQueue>, EditReceiver) {
    let (tx, rx) = mpsc::channel(1);
    let queue = Arc::new(EditQueue {
        pending: Mutex::new(Batch::default()),
        signal: tx,
        closed: AtomicBool::new(false),
    });
    let receiver = EditReceiver {
        queue: Arc::clone(&queue),
        signal: rx,
    };
    (queue, receiver)
}

impl EditQueue {
    /// Record the full new content of a document.
    ///
    /// Returns `false` once the queue is closed.
    pub fn push(&self, uri: String, content: Content) -> bool {
        if self.is_closed() {
            return false;
        }
        let mut pending = self.pending.lock();
        pending.insert(uri, content);
        // A full slot means a drain is already due.
        let _ = self.signal.try_send(());
        true
    }

    /// Stop accepting edits and wake the consumer so it can exit.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let _pending = self.pending.lock();
        let _ = self.signal.try_send(());
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of edits waiting for the next drain.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }
}

impl EditReceiver {
    /// Wait for a signal, optionally stay quiet, then drain everything.
    ///
    /// Returns `None` once the queue has been closed.
    pub async fn next_batch(&mut self, quiet: Option<Duration>) -> Option<Batch> {
        // The close signal may have been swallowed by the previous drain.
        if self.queue.is_closed() {
            return None;
        }
        self.signal.recv().await?;
        if self.queue.is_closed() {
            return None;
        }
        if let Some(quiet) = quiet {
            tokio::time::sleep(quiet).await;
        }

        let mut pending = self.queue.pending.lock();
        let batch = std::mem::take(&mut *pending);
        while self.signal.try_recv().is_ok() {}
        drop(pending);

        Some(batch)
    }
}
