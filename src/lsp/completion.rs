//! Attribute value completion.

use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Position};

use super::{Document, current_manifest, docs, is_epub_type};
use crate::core::FileKind;
use crate::workspace::WorkspaceStore;

/// Characters that re-trigger completion in the client.
pub const TRIGGER_CHARACTERS: &[&str] = &["<", "\"", ":", " "];

pub fn completion(store: &WorkspaceStore, uri: &str, position: Position) -> Vec<CompletionItem> {
    let Some(doc) = Document::open(store, uri) else {
        return Vec::new();
    };
    let Some(located) = doc.locate(position) else {
        return Vec::new();
    };
    let Some(attr) = located.value_attr() else {
        return Vec::new();
    };

    match (doc.kind, located.node.local.as_str(), attr.local.as_str()) {
        (FileKind::Manifest, "meta", "property") => schema_properties(),
        (FileKind::Manifest, "itemref", "idref") => manifest_ids(store),
        (FileKind::Manifest, "item", "media-type") => media_types(),
        (kind, ..) if kind.is_xhtml() && is_epub_type(attr) => epub_types(),
        _ => Vec::new(),
    }
}

fn item(label: &str, kind: CompletionItemKind, detail: Option<String>) -> CompletionItem {
    CompletionItem {
        label: label.to_string(),
        kind: Some(kind),
        detail,
        ..Default::default()
    }
}

fn schema_properties() -> Vec<CompletionItem> {
    docs::SCHEMA_PROPERTIES
        .iter()
        .map(|(name, detail, _)| item(name, CompletionItemKind::PROPERTY, Some(detail.to_string())))
        .collect()
}

fn manifest_ids(store: &WorkspaceStore) -> Vec<CompletionItem> {
    let Some(manifest) = current_manifest(store) else {
        return Vec::new();
    };
    manifest
        .items
        .iter()
        .filter(|i| !i.id.is_empty())
        .map(|i| {
            let detail = format!("{} ({})", i.href, i.media_type);
            item(&i.id, CompletionItemKind::VALUE, Some(detail))
        })
        .collect()
}

fn media_types() -> Vec<CompletionItem> {
    docs::MEDIA_TYPES
        .iter()
        .map(|media_type| item(media_type, CompletionItemKind::ENUM_MEMBER, None))
        .collect()
}

fn epub_types() -> Vec<CompletionItem> {
    docs::EPUB_TYPES
        .iter()
        .map(|(token, title, _)| item(token, CompletionItemKind::ENUM_MEMBER, Some(title.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsp::testutil::*;

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|i| i.label.as_str()).collect()
    }

    #[test]
    fn test_meta_property_values() {
        let store = book();
        let items = completion(&store, OPF_URI, at(OPF, "property=\"schema", 11));
        assert_eq!(items.len(), 5);
        assert!(labels(&items).contains(&"schema:accessibilitySummary"));
    }

    #[test]
    fn test_itemref_ids() {
        let store = book();
        let items = completion(&store, OPF_URI, at(OPF, "idref=\"ch1", 8));
        assert_eq!(labels(&items), ["nav", "ch1", "ch2"]);
        assert_eq!(items[1].detail.as_deref(), Some("ch1.xhtml (application/xhtml+xml)"));
    }

    #[test]
    fn test_media_types() {
        let store = book();
        let items = completion(&store, OPF_URI, at(OPF, "media-type=\"application", 13));
        assert!(labels(&items).contains(&"text/css"));
    }

    #[test]
    fn test_epub_type_tokens() {
        let store = book();
        let items = completion(&store, CH1_URI, at(CH1, "epub:type=\"chapter", 12));
        assert!(labels(&items).contains(&"footnote"));
        assert!(items.iter().all(|i| i.kind == Some(CompletionItemKind::ENUM_MEMBER)));
    }

    #[test]
    fn test_outside_values_is_empty() {
        let store = book();
        assert!(completion(&store, OPF_URI, at(OPF, "<spine>", 2)).is_empty());
        assert!(completion(&store, CH1_URI, at(CH1, "href=\"ch2", 7)).is_empty());
    }
}
