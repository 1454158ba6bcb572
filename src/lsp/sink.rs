//! Diagnostics publication through the protocol client.

use std::future::Future;

use tower_lsp::Client;
use tower_lsp::lsp_types::Url;

use super::convert::to_lsp_diagnostic;
use crate::actor::{DiagnosticSink, PublishError};
use crate::core::Diagnostic;

/// Sends `textDocument/publishDiagnostics` for every completed file.
#[derive(Clone)]
pub struct ClientSink {
    client: Client,
}

impl ClientSink {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl DiagnosticSink for ClientSink {
    fn publish(
        &self,
        uri: &str,
        diagnostics: Vec<Diagnostic>,
    ) -> impl Future<Output = Result<(), PublishError>> + Send {
        let client = self.client.clone();
        let url = Url::parse(uri).map_err(|_| PublishError::InvalidUri(uri.to_string()));
        let diagnostics: Vec<_> = diagnostics.iter().map(to_lsp_diagnostic).collect();

        async move {
            client.publish_diagnostics(url?, diagnostics, None).await;
            Ok(())
        }
    }
}
