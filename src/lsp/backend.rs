//! `tower_lsp` backend.
//!
//! Edits go to the debounced edit queue; everything else is answered from
//! the workspace store. The validation pipeline only starts consuming once
//! `initialize` has supplied the workspace root.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use super::sink::ClientSink;
use super::{code_action, completion, definition, hover, references};
use crate::actor::debouncer::EditQueue;
use crate::actor::{Coordinator, Inbox, SessionStart};
use crate::config::ServerConfig;
use crate::validator::Registry;
use crate::workspace::WorkspaceStore;
use crate::{debug, log};

pub struct Backend {
    client: Client,
    store: Arc<WorkspaceStore>,
    edits: Arc<EditQueue>,
    /// Taken by the first `initialize`.
    start: Mutex<Option<oneshot::Sender<SessionStart>>>,
    /// `--config`, wins over the workspace file.
    config_path: Option<PathBuf>,
}

impl Backend {
    pub fn new(
        client: Client,
        store: Arc<WorkspaceStore>,
        inbox: Inbox,
        config_path: Option<PathBuf>,
    ) -> Self {
        Self {
            client,
            store,
            edits: inbox.edits,
            start: Mutex::new(Some(inbox.start)),
            config_path,
        }
    }

    /// Build the engine and spawn its actors on the current runtime.
    pub fn spawn(client: Client, config_path: Option<PathBuf>) -> Self {
        let store = Arc::new(WorkspaceStore::new());
        let registry = Arc::new(Registry::with_defaults());
        let (coordinator, inbox) = Coordinator::new(Arc::clone(&store), registry);
        tokio::spawn(coordinator.run(ClientSink::new(client.clone())));
        Self::new(client, store, inbox, config_path)
    }

    fn load_config(&self, root: Option<&std::path::Path>) -> ServerConfig {
        match ServerConfig::load(self.config_path.as_deref(), root) {
            Ok(config) => config,
            Err(err) => {
                log!("config"; "{}, using defaults", err);
                ServerConfig::default()
            }
        }
    }

    fn push_edit(&self, uri: Url, text: String) {
        if !self.edits.push(uri.to_string(), Arc::from(text.into_bytes())) {
            debug!("server"; "shutting down, dropped edit for {}", uri);
        }
    }
}

/// `rootUri`, else the first workspace folder.
#[allow(deprecated)]
fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    params
        .root_uri
        .as_ref()
        .and_then(|uri| uri.to_file_path().ok())
        .or_else(|| {
            let folder = params.workspace_folders.as_ref()?.first()?;
            folder.uri.to_file_path().ok()
        })
}

fn capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
        hover_provider: Some(HoverProviderCapability::Simple(true)),
        definition_provider: Some(OneOf::Left(true)),
        references_provider: Some(OneOf::Left(true)),
        completion_provider: Some(CompletionOptions {
            trigger_characters: Some(
                completion::TRIGGER_CHARACTERS
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            ),
            ..Default::default()
        }),
        code_action_provider: Some(CodeActionProviderCapability::Options(CodeActionOptions {
            code_action_kinds: Some(vec![CodeActionKind::QUICKFIX, CodeActionKind::SOURCE_FIX_ALL]),
            ..Default::default()
        })),
        ..Default::default()
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root = workspace_root(&params);
        let mut config = self.load_config(root.as_deref());
        config.apply_init_options(params.initialization_options.as_ref());

        log!(
            "server";
            "initialize, root: {}, accessibility: {}",
            root.as_ref().map_or("<none>".into(), |r| r.display().to_string()),
            config.accessibility.severity.name()
        );

        if let Some(start) = self.start.lock().take() {
            let _ = start.send(SessionStart { root, config });
        }

        Ok(InitializeResult {
            capabilities: capabilities(),
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "epub-lsp initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        log!("server"; "shutdown requested");
        self.edits.close();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.push_edit(params.text_document.uri, params.text_document.text);
    }

    async fn did_change(&self, mut params: DidChangeTextDocumentParams) {
        // Full sync: the last change carries the whole document.
        if let Some(change) = params.content_changes.pop() {
            self.push_edit(params.text_document.uri, change.text);
        }
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let at = params.text_document_position_params;
        Ok(hover::hover(&self.store, at.text_document.uri.as_str(), at.position))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let at = params.text_document_position_params;
        let locations = definition::definition(&self.store, at.text_document.uri.as_str(), at.position);
        Ok((!locations.is_empty()).then_some(GotoDefinitionResponse::Array(locations)))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let at = params.text_document_position;
        let locations = references::references(&self.store, at.text_document.uri.as_str(), at.position);
        Ok((!locations.is_empty()).then_some(locations))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let at = params.text_document_position;
        let items = completion::completion(&self.store, at.text_document.uri.as_str(), at.position);
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let actions = code_action::code_actions(
            &self.store,
            params.text_document.uri.as_str(),
            params.range,
            &params.context,
        );
        Ok(Some(actions.into_iter().map(CodeActionOrCommand::CodeAction).collect()))
    }
}
