//! Find references.

use tower_lsp::lsp_types::{Location, Position};

use super::{Document, convert};
use crate::core::FileKind;
use crate::core::href::{split_fragment, strip_fragment};
use crate::parser::{XmlNode, parse};
use crate::workspace::WorkspaceStore;

pub fn references(store: &WorkspaceStore, uri: &str, position: Position) -> Vec<Location> {
    let Some(doc) = Document::open(store, uri) else {
        return Vec::new();
    };
    let Some(located) = doc.locate(position) else {
        return Vec::new();
    };
    let node = located.node;

    match doc.kind {
        FileKind::Manifest if node.local == "item" => match node.id() {
            Some(id) => item_references(store, &doc, id, node.attr("href").unwrap_or_default()),
            None => Vec::new(),
        },
        kind if kind.is_xhtml() => {
            let id = located
                .value_attr()
                .filter(|a| a.local == "id")
                .map(|a| a.value.as_str())
                .or_else(|| node.id());
            match id {
                Some(id) => fragment_references(store, id),
                None => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

/// Spine entries of the item plus anchors linking to its file.
fn item_references(store: &WorkspaceStore, doc: &Document, id: &str, href: &str) -> Vec<Location> {
    let mut locations: Vec<Location> = doc
        .root
        .find_all("itemref")
        .into_iter()
        .filter(|itemref| itemref.attr("idref") == Some(id))
        .filter_map(|itemref| doc.location_of(itemref))
        .collect();

    if href.is_empty() {
        return locations;
    }
    let suffix = format!("/{href}");

    visit(store, &[FileKind::Content, FileKind::Navigation], |uri, content, root| {
        for anchor in root.find_all("a") {
            let target = strip_fragment(anchor.attr("href").unwrap_or_default());
            if target == href || target.ends_with(&suffix) {
                locations.extend(convert::location_at(uri, content, anchor.offset));
            }
        }
    });
    locations
}

/// Every element whose `href` fragment equals `id`.
fn fragment_references(store: &WorkspaceStore, id: &str) -> Vec<Location> {
    let mut locations = Vec::new();
    let kinds = [FileKind::Content, FileKind::Navigation, FileKind::Manifest];

    visit(store, &kinds, |uri, content, root| {
        for node in root.descendants() {
            let links_here = node
                .attrs
                .iter()
                .filter(|a| a.local == "href")
                .any(|a| split_fragment(&a.value).1 == Some(id));
            if links_here {
                locations.extend(convert::location_at(uri, content, node.offset));
            }
        }
    });
    locations
}

/// Parsed store documents of the given kinds, in URI order.
fn visit(store: &WorkspaceStore, kinds: &[FileKind], mut f: impl FnMut(&str, &[u8], &XmlNode)) {
    let file_kinds = store.kinds();
    for (uri, content) in store.files() {
        if !file_kinds.get(&uri).is_some_and(|kind| kinds.contains(kind)) {
            continue;
        }
        if let Ok(root) = parse(&content) {
            f(&uri, &content, &root);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsp::testutil::*;

    fn uris(locations: &[Location]) -> Vec<&str> {
        locations.iter().map(|l| l.uri.as_str()).collect()
    }

    #[test]
    fn test_manifest_item_references() {
        let store = book();
        let found = references(&store, OPF_URI, at(OPF, "<item id=\"ch1\"", 3));
        // itemref first, then anchors in URI order: ch2 then nav.
        assert_eq!(uris(&found), [OPF_URI, CH2_URI, NAV_URI]);
    }

    #[test]
    fn test_id_value_references() {
        let store = book();
        let found = references(&store, CH1_URI, at(CH1, "id=\"one\"", 5));
        assert_eq!(uris(&found), [CH1_URI, NAV_URI]);
    }

    #[test]
    fn test_element_with_id() {
        let store = book();
        let found = references(&store, CH2_URI, at(CH2, "<section", 2));
        assert_eq!(uris(&found), [CH1_URI]);
    }

    #[test]
    fn test_no_id_no_references() {
        let store = book();
        assert!(references(&store, CH1_URI, at(CH1, "<p>See", 1)).is_empty());
        assert!(references(&store, OPF_URI, at(OPF, "<spine>", 2)).is_empty());
    }
}
