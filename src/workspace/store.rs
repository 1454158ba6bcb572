//! Open documents, their kinds and their latest diagnostics.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::core::{Diagnostic, FileKind};

/// Shared document content; cloning is a reference-count bump.
pub type Content = Arc<[u8]>;

/// Thread-safe workspace state, shared as `Arc<WorkspaceStore>`.
///
/// Contents are keyed by URI in a `BTreeMap` so every walk over the
/// workspace is in URI order.
#[derive(Debug, Default)]
pub struct WorkspaceStore {
    contents: RwLock<BTreeMap<String, Content>>,
    kinds: RwLock<FxHashMap<String, FileKind>>,
    diagnostics: RwLock<FxHashMap<String, Vec<Diagnostic>>>,
}

impl WorkspaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the latest content of a document and refresh its kind.
    pub fn update(&self, uri: &str, content: Content) -> FileKind {
        let kind = FileKind::detect(uri, &content);
        self.contents.write().insert(uri.to_string(), content);
        self.kinds.write().insert(uri.to_string(), kind);
        kind
    }

    pub fn content(&self, uri: &str) -> Option<Content> {
        self.contents.read().get(uri).cloned()
    }

    /// Kind recorded at the last update, `Unknown` for untracked URIs.
    pub fn kind(&self, uri: &str) -> FileKind {
        self.kinds.read().get(uri).copied().unwrap_or(FileKind::Unknown)
    }

    /// Every tracked URI, in order.
    pub fn uris(&self) -> Vec<String> {
        self.contents.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.contents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.read().is_empty()
    }

    /// Point-in-time copy of all contents.
    pub fn files(&self) -> BTreeMap<String, Content> {
        self.contents.read().clone()
    }

    pub fn kinds(&self) -> FxHashMap<String, FileKind> {
        self.kinds.read().clone()
    }

    /// Replace the stored diagnostics of a document.
    pub fn set_diagnostics(&self, uri: &str, diagnostics: Vec<Diagnostic>) {
        self.diagnostics.write().insert(uri.to_string(), diagnostics);
    }

    /// Diagnostics from the most recent published validation.
    pub fn diagnostics(&self, uri: &str) -> Vec<Diagnostic> {
        self.diagnostics.read().get(uri).cloned().unwrap_or_default()
    }
}
