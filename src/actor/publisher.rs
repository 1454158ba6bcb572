//! Publisher Actor - single consumer of validation results
//!
//! Every completed per-file result is written into the store first and then
//! handed to the sink. A failed publication is logged and dropped; the loop
//! keeps going.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use super::messages::PublishMsg;
use crate::core::Diagnostic;
use crate::workspace::WorkspaceStore;
use crate::{debug, log};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("invalid document URI `{0}`")]
    InvalidUri(String),
    #[error("client connection closed")]
    Closed,
}

/// Outbound destination for diagnostics (the protocol client, or a test probe).
pub trait DiagnosticSink: Send + Sync + 'static {
    fn publish(
        &self,
        uri: &str,
        diagnostics: Vec<Diagnostic>,
    ) -> impl Future<Output = Result<(), PublishError>> + Send;
}

pub struct PublisherActor<S> {
    rx: mpsc::Receiver<PublishMsg>,
    store: Arc<WorkspaceStore>,
    sink: S,
}

impl<S: DiagnosticSink> PublisherActor<S> {
    pub fn new(rx: mpsc::Receiver<PublishMsg>, store: Arc<WorkspaceStore>, sink: S) -> Self {
        Self { rx, store, sink }
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                PublishMsg::Diagnostics { uri, diagnostics } => {
                    self.store.set_diagnostics(&uri, diagnostics.clone());
                    debug!("publish"; "{} ({})", uri, diagnostics.len());
                    if let Err(err) = self.sink.publish(&uri, diagnostics).await {
                        log!("publish"; "dropped {}: {}", uri, err);
                    }
                }
                PublishMsg::Shutdown => break,
            }
        }
    }
}
