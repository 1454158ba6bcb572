//! Language Server Protocol surface.
//!
//! # Module Structure
//!
//! - `backend` - `tower_lsp::LanguageServer` implementation
//! - `sink` - diagnostics publication through the client
//! - `convert` - engine <-> protocol types
//! - `hover`, `definition`, `references`, `completion`, `code_action` -
//!   navigation features, pure functions over the workspace store
//! - `docs` - vocabulary tables for hover and completion

pub mod backend;
mod code_action;
mod completion;
mod convert;
mod definition;
mod docs;
mod hover;
mod references;
pub mod sink;

pub use backend::Backend;
pub use sink::ClientSink;

use std::collections::BTreeMap;

use tower_lsp::lsp_types as lsp;

use crate::core::href::{decode, dir_of_uri, path_ends_with, resolve_href, uri_path};
use crate::core::{FileKind, ManifestInfo, namespace, position_to_offset};
use crate::parser::{Located, XmlAttr, XmlNode, locate, parse};
use crate::workspace::{Content, WorkspaceStore, select_manifest};

/// A stored document that parsed cleanly.
pub(crate) struct Document {
    pub uri: String,
    pub content: Content,
    pub kind: FileKind,
    pub root: XmlNode,
}

impl Document {
    /// `None` when the URI is unknown or the content is malformed.
    pub fn open(store: &WorkspaceStore, uri: &str) -> Option<Self> {
        let content = store.content(uri)?;
        let root = parse(&content).ok()?;
        Some(Self {
            uri: uri.to_string(),
            kind: store.kind(uri),
            content,
            root,
        })
    }

    /// Element and attribute under a protocol position.
    pub fn locate(&self, position: lsp::Position) -> Option<Located<'_>> {
        let offset = position_to_offset(&self.content, convert::from_lsp_position(position))?;
        locate(&self.root, &self.content, offset)
    }

    pub fn location_of(&self, node: &XmlNode) -> Option<lsp::Location> {
        convert::location_at(&self.uri, &self.content, node.offset)
    }
}

/// Package info selected the same way validation snapshots select it.
pub(crate) fn current_manifest(store: &WorkspaceStore) -> Option<ManifestInfo> {
    select_manifest(&store.files(), &store.kinds()).map(|(_, info)| info)
}

pub(crate) fn is_epub_type(attr: &XmlAttr) -> bool {
    attr.local == "type" && (attr.space == namespace::EPUB || attr.space == "epub")
}

/// First element in document order carrying `id`.
pub(crate) fn find_by_id<'a>(root: &'a XmlNode, id: &str) -> Option<&'a XmlNode> {
    root.descendants().into_iter().find(|n| n.attr("id") == Some(id))
}

/// Store file an href points at: exact resolved path first, then path suffix.
pub(crate) fn find_target<'a>(
    files: &'a BTreeMap<String, Content>,
    base_uri: &str,
    href: &str,
) -> Option<(&'a String, &'a Content)> {
    let resolved = resolve_href(&dir_of_uri(base_uri), href);
    let decoded = decode(href);
    files
        .iter()
        .find(|(uri, _)| uri_path(uri) == resolved)
        .or_else(|| files.iter().find(|(uri, _)| path_ends_with(&uri_path(uri), &decoded)))
}

/// Zero-width location at the start of a file.
pub(crate) fn file_start(uri: &str) -> Option<lsp::Location> {
    convert::location_at(uri, b"", 0)
}
