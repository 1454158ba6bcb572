//! Actor Coordinator - wires the validation pipeline
//!
//! ```text
//! EditQueue --> Dispatcher --> PublisherActor --> DiagnosticSink
//!  (handlers)   (batches)      (store + client)
//! ```
//!
//! The coordinator holds no business logic: it creates the channels, hands
//! the producer ends to the protocol layer and runs the actors.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use super::debouncer::{EditQueue, EditReceiver, edit_queue};
use super::dispatcher::Dispatcher;
use super::messages::{PublishMsg, SessionStart};
use super::publisher::{DiagnosticSink, PublisherActor};
use crate::validator::Registry;
use crate::workspace::WorkspaceStore;

/// Channel buffer size
const CHANNEL_BUFFER: usize = 32;

/// Producer ends handed to the protocol handlers.
#[derive(Debug)]
pub struct Inbox {
    pub edits: Arc<EditQueue>,
    pub start: oneshot::Sender<SessionStart>,
}

pub struct Coordinator {
    store: Arc<WorkspaceStore>,
    registry: Arc<Registry>,
    edits: EditReceiver,
    start: oneshot::Receiver<SessionStart>,
}

impl Coordinator {
    pub fn new(store: Arc<WorkspaceStore>, registry: Arc<Registry>) -> (Self, Inbox) {
        let (queue, edits) = edit_queue();
        let (start_tx, start_rx) = oneshot::channel();
        let coordinator = Self {
            store,
            registry,
            edits,
            start: start_rx,
        };
        let inbox = Inbox {
            edits: queue,
            start: start_tx,
        };
        (coordinator, inbox)
    }

    /// Run dispatcher and publisher until the edit queue closes.
    pub async fn run<S: DiagnosticSink>(self, sink: S) {
        let (publish_tx, publish_rx) = mpsc::channel::<PublishMsg>(CHANNEL_BUFFER);

        let publisher = PublisherActor::new(publish_rx, Arc::clone(&self.store), sink);
        let dispatcher = Dispatcher::new(self.store, self.registry, publish_tx);

        let publisher_handle = tokio::spawn(publisher.run());
        dispatcher.run(self.start, self.edits).await;

        crate::debug!("server"; "waiting for publisher");
        let _ = publisher_handle.await;
    }
}
