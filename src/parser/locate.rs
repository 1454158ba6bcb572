//! Cursor location: byte offset -> element, attribute and in-value flag.

use super::attr::locate_attribute;
use super::span::{find_element_end, find_tag_end};
use super::xml::{XmlAttr, XmlNode};

/// Most specific entity under a cursor.
#[derive(Debug, Clone, Copy)]
pub struct Located<'a> {
    pub node: &'a XmlNode,
    pub attr: Option<&'a XmlAttr>,
    /// Cursor sits inside `attr`'s value.
    pub in_value: bool,
}

impl<'a> Located<'a> {
    /// Attribute under the cursor when the cursor is inside its value.
    pub fn value_attr(&self) -> Option<&'a XmlAttr> {
        self.attr.filter(|_| self.in_value)
    }
}

/// Resolve `offset` against a parsed tree.
///
/// Overlapping approximate spans resolve to the first child in document
/// order that contains the offset; earlier decisions are never revisited.
pub fn locate<'a>(root: &'a XmlNode, content: &[u8], offset: usize) -> Option<Located<'a>> {
    if offset >= content.len() {
        return None;
    }

    let node = find_deepest(root, content, offset)?;

    if offset <= find_tag_end(content, node.offset) {
        for attr in &node.attrs {
            if let Some(span) = locate_attribute(content, node, attr)
                && span.contains(offset)
            {
                return Some(Located {
                    node,
                    attr: Some(attr),
                    in_value: span.in_value(offset),
                });
            }
        }
    }

    Some(Located {
        node,
        attr: None,
        in_value: false,
    })
}

fn find_deepest<'a>(node: &'a XmlNode, content: &[u8], offset: usize) -> Option<&'a XmlNode> {
    for child in &node.children {
        if child.offset > offset {
            break;
        }
        if let Some(deeper) = find_deepest(child, content, offset) {
            return Some(deeper);
        }
        if offset <= find_element_end(content, child.offset, &child.qualified_name()) {
            return Some(child);
        }
    }
    None
}
