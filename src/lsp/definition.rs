//! Go to definition.

use tower_lsp::lsp_types::{Location, Position};

use super::{Document, convert, file_start, find_by_id, find_target};
use crate::core::FileKind;
use crate::core::href::{is_remote_url, split_fragment};
use crate::parser::{XmlAttr, XmlNode, parse};
use crate::workspace::WorkspaceStore;

pub fn definition(store: &WorkspaceStore, uri: &str, position: Position) -> Vec<Location> {
    let Some(doc) = Document::open(store, uri) else {
        return Vec::new();
    };
    let Some(located) = doc.locate(position) else {
        return Vec::new();
    };
    let Some(attr) = located.value_attr() else {
        return Vec::new();
    };

    let found = match doc.kind {
        FileKind::Manifest => in_package(store, &doc, located.node, attr),
        kind if kind.is_xhtml() && attr.local == "href" && !is_remote_url(&attr.value) => {
            href_target(store, &doc, &attr.value)
        }
        _ => None,
    };
    found.into_iter().collect()
}

fn in_package(
    store: &WorkspaceStore,
    doc: &Document,
    node: &XmlNode,
    attr: &XmlAttr,
) -> Option<Location> {
    match (node.local.as_str(), attr.local.as_str()) {
        ("itemref", "idref") => doc
            .root
            .find_all("item")
            .into_iter()
            .find(|item| item.attr("id") == Some(attr.value.as_str()))
            .and_then(|item| doc.location_of(item)),
        ("item", "href") => {
            let files = store.files();
            let (target, _) = find_target(&files, &doc.uri, &attr.value)?;
            file_start(target)
        }
        ("package", "unique-identifier") => {
            find_by_id(&doc.root, &attr.value).and_then(|node| doc.location_of(node))
        }
        _ => None,
    }
}

fn href_target(store: &WorkspaceStore, doc: &Document, href: &str) -> Option<Location> {
    let (file, fragment) = split_fragment(href);
    let fragment = fragment.filter(|f| !f.is_empty());

    if file.is_empty() {
        let node = find_by_id(&doc.root, fragment?)?;
        return doc.location_of(node);
    }

    let files = store.files();
    let (target, content) = find_target(&files, &doc.uri, file)?;
    let Some(fragment) = fragment else {
        return file_start(target);
    };

    let root = parse(content).ok()?;
    let node = find_by_id(&root, fragment)?;
    convert::location_at(target, content, node.offset)
}
