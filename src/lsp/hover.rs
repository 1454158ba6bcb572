//! Hover documentation.

use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};

use super::{Document, current_manifest, docs, is_epub_type};
use crate::core::{FileKind, namespace};
use crate::parser::Located;
use crate::workspace::WorkspaceStore;

pub fn hover(store: &WorkspaceStore, uri: &str, position: Position) -> Option<Hover> {
    let doc = Document::open(store, uri)?;
    let located = doc.locate(position)?;

    let text = match doc.kind {
        FileKind::Manifest => hover_package(&located, store),
        kind if kind.is_xhtml() => epub_type_value(&located),
        _ => None,
    }?;

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: text,
        }),
        range: None,
    })
}

fn hover_package(located: &Located<'_>, store: &WorkspaceStore) -> Option<String> {
    let node = located.node;

    if node.local == "itemref"
        && let Some(attr) = located.value_attr().filter(|a| a.local == "idref")
        && let Some(manifest) = current_manifest(store)
        && let Some(item) = manifest.item_by_id(&attr.value)
    {
        return Some(format!(
            "**Manifest Item**\n- **ID:** {}\n- **Href:** {}\n- **Media-Type:** {}",
            item.id, item.href, item.media_type
        ));
    }

    if node.local == "meta"
        && let Some(doc) = node.attr("property").and_then(docs::schema_property)
    {
        return Some(doc);
    }

    if let Some(doc) = epub_type_value(located) {
        return Some(doc);
    }

    if node.space == namespace::DC {
        return docs::dc_element(&node.local);
    }

    None
}

fn epub_type_value(located: &Located<'_>) -> Option<String> {
    let attr = located.value_attr().filter(|a| is_epub_type(a))?;
    docs::epub_type_list(&attr.value)
}
