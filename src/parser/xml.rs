//! Namespace-aware XML tree builder on top of quick-xml.
//!
//! Every element records the byte offset of its opening `<`. End offsets are
//! not stored; see [`super::span`] for on-demand span discovery.

use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

use crate::core::namespace;

/// Ill-formed document, positioned at the failing byte.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct XmlError {
    pub offset: usize,
    pub message: String,
}

impl XmlError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Attribute with its resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttr {
    pub space: String,
    pub local: String,
    pub value: String,
    /// Prefix as spelled in the source (`epub` for `epub:type`).
    pub prefix: Option<String>,
}

impl XmlAttr {
    /// Qualified name as spelled in the source.
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local),
            None => self.local.clone(),
        }
    }
}

/// Element node. The tree root is a synthetic `#document` node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub space: String,
    pub local: String,
    /// Prefix as spelled in the source (`dc` for `dc:title`).
    pub prefix: Option<String>,
    pub attrs: Vec<XmlAttr>,
    pub children: Vec<XmlNode>,
    /// Character data accumulated from all direct text children.
    pub text: String,
    /// Byte offset of the opening `<`.
    pub offset: usize,
}

pub const DOCUMENT: &str = "#document";

impl XmlNode {
    fn document() -> Self {
        Self {
            local: DOCUMENT.to_string(),
            ..Self::default()
        }
    }

    /// First element child of the document root.
    pub fn root_element(&self) -> Option<&XmlNode> {
        if self.local == DOCUMENT {
            self.children.first()
        } else {
            Some(self)
        }
    }

    /// Element name as spelled in the source.
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local),
            None => self.local.clone(),
        }
    }

    /// Value of an attribute without namespace.
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.space.is_empty() && a.local == local)
            .map(|a| a.value.as_str())
    }

    /// Value of a namespaced attribute.
    pub fn attr_ns(&self, space: &str, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.space == space && a.local == local)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, local: &str) -> bool {
        self.attr(local).is_some()
    }

    /// `epub:type`, also accepted when the `epub` prefix was never bound.
    pub fn epub_type(&self) -> Option<&str> {
        self.attr_ns(namespace::EPUB, "type")
            .or_else(|| self.attr_ns("epub", "type"))
    }

    /// `id` attribute, if non-empty.
    pub fn id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.is_empty())
    }

    /// All descendants in document order (self excluded).
    pub fn descendants(&self) -> Vec<&XmlNode> {
        let mut out = Vec::new();
        fn walk<'a>(node: &'a XmlNode, out: &mut Vec<&'a XmlNode>) {
            for child in &node.children {
                out.push(child);
                walk(child, out);
            }
        }
        walk(self, &mut out);
        out
    }

    /// Descendants with the given local name, any namespace.
    pub fn find_all(&self, local: &str) -> Vec<&XmlNode> {
        self.descendants()
            .into_iter()
            .filter(|n| n.local == local)
            .collect()
    }

    /// Descendants with the given namespace and local name.
    pub fn find_all_ns(&self, space: &str, local: &str) -> Vec<&XmlNode> {
        self.descendants()
            .into_iter()
            .filter(|n| n.space == space && n.local == local)
            .collect()
    }

    pub fn find_first(&self, local: &str) -> Option<&XmlNode> {
        self.descendants().into_iter().find(|n| n.local == local)
    }

    pub fn find_first_ns(&self, space: &str, local: &str) -> Option<&XmlNode> {
        self.descendants()
            .into_iter()
            .find(|n| n.space == space && n.local == local)
    }

    /// Direct children with the given local name.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |n| n.local == local)
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Prefix bindings declared on one element (`""` is the default namespace).
type Scope = Vec<(String, String)>;

/// Parse a complete document into a tree rooted at `#document`.
pub fn parse(content: &[u8]) -> Result<XmlNode, XmlError> {
    let mut reader = Reader::from_reader(content);
    reader.config_mut().check_end_names = true;

    let mut stack: Vec<XmlNode> = vec![XmlNode::document()];
    let mut scopes: Vec<Scope> = Vec::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(XmlError::new(reader.error_position() as usize, e.to_string()));
            }
        };
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(elem) => {
                let offset = tag_start(content, end, elem.len(), false);
                let node = open_element(&elem, offset, &mut scopes)?;
                stack.push(node);
            }
            Event::Empty(elem) => {
                let offset = tag_start(content, end, elem.len(), true);
                let node = open_element(&elem, offset, &mut scopes)?;
                scopes.pop();
                push_child(&mut stack, node);
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(XmlError::new(end, "unexpected end element"));
                }
                scopes.pop();
                if let Some(node) = stack.pop() {
                    push_child(&mut stack, node);
                }
            }
            Event::Text(text) => push_text(&mut stack, &String::from_utf8_lossy(&text)),
            Event::CData(data) => push_text(&mut stack, &String::from_utf8_lossy(&data)),
            Event::GeneralRef(entity) => {
                let name = String::from_utf8_lossy(&entity).into_owned();
                let Some(resolved) = resolve_entity(&name) else {
                    let offset = end.saturating_sub(name.len() + 2);
                    return Err(XmlError::new(
                        offset,
                        format!("invalid character entity &{name};"),
                    ));
                };
                push_text(&mut stack, &resolved);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() > 1 {
        return Err(XmlError::new(content.len(), "unexpected EOF"));
    }
    stack
        .pop()
        .ok_or_else(|| XmlError::new(content.len(), "unexpected EOF"))
}

/// Offset of the `<` for a tag whose bytes end at `end`.
fn tag_start(content: &[u8], end: usize, inner_len: usize, empty: bool) -> usize {
    let delimiters = if empty { 3 } else { 2 };
    if let Some(start) = end.checked_sub(inner_len + delimiters)
        && content.get(start) == Some(&b'<')
    {
        return start;
    }
    content[..end.min(content.len())]
        .iter()
        .rposition(|&b| b == b'<')
        .unwrap_or(0)
}

fn open_element(
    elem: &BytesStart<'_>,
    offset: usize,
    scopes: &mut Vec<Scope>,
) -> Result<XmlNode, XmlError> {
    let mut raw_attrs = Vec::new();
    let mut bindings = Scope::new();

    for attr in elem.attributes() {
        let attr = attr.map_err(|e| XmlError::new(offset, e.to_string()))?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value).into_owned();
        let value = unescape(&raw)
            .map_err(|e| XmlError::new(offset, e.to_string()))?
            .into_owned();

        if name == "xmlns" {
            bindings.push((String::new(), value.clone()));
        } else if let Some(prefix) = name.strip_prefix("xmlns:") {
            bindings.push((prefix.to_string(), value.clone()));
        }
        raw_attrs.push((name, value));
    }
    scopes.push(bindings);

    let qname = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
    let (prefix, local) = split_qname(&qname);

    let attrs = raw_attrs
        .into_iter()
        .map(|(name, value)| {
            if name == "xmlns" {
                return XmlAttr {
                    space: String::new(),
                    local: name,
                    value,
                    prefix: None,
                };
            }
            let (prefix, local) = split_qname(&name);
            XmlAttr {
                space: resolve_prefix(scopes, prefix, false),
                local: local.to_string(),
                value,
                prefix: prefix.map(str::to_string),
            }
        })
        .collect();

    Ok(XmlNode {
        space: resolve_prefix(scopes, prefix, true),
        local: local.to_string(),
        prefix: prefix.map(str::to_string),
        attrs,
        children: Vec::new(),
        text: String::new(),
        offset,
    })
}

fn split_qname(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => (Some(prefix), local),
        _ => (None, name),
    }
}

/// Resolve a prefix through the open scopes. Unbound prefixes are kept verbatim.
fn resolve_prefix(scopes: &[Scope], prefix: Option<&str>, is_element: bool) -> String {
    match prefix {
        None if !is_element => String::new(),
        Some("xml") => namespace::XML.to_string(),
        Some("xmlns") => "xmlns".to_string(),
        _ => {
            let key = prefix.unwrap_or("");
            scopes
                .iter()
                .rev()
                .flat_map(|scope| scope.iter())
                .find(|(p, _)| p == key)
                .map_or_else(|| key.to_string(), |(_, uri)| uri.clone())
        }
    }
}

fn resolve_entity(name: &str) -> Option<String> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    resolve_predefined_entity(name).map(str::to_string)
}

fn push_child(stack: &mut [XmlNode], node: XmlNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn push_text(stack: &mut [XmlNode], text: &str) {
    if let Some(node) = stack.last_mut() {
        node.text.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offsets_and_text() {
        let content = b"<?xml version=\"1.0\"?>\n<root><child a=\"1\">hi &amp; bye</child><e/></root>";
        let doc = parse(content).unwrap();
        let root = doc.root_element().unwrap();

        assert_eq!(root.local, "root");
        assert_eq!(root.offset, 22);
        assert_eq!(root.children.len(), 2);

        let child = &root.children[0];
        assert_eq!(&content[child.offset..child.offset + 6], b"<child");
        assert_eq!(child.text, "hi & bye");
        assert_eq!(child.attr("a"), Some("1"));

        let empty = &root.children[1];
        assert_eq!(&content[empty.offset..empty.offset + 4], b"<e/>");
    }

    #[test]
    fn test_namespace_resolution() {
        let content = br#"<package xmlns="http://www.idpf.org/2007/opf" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <metadata><dc:title xml:lang="en">T</dc:title><x:y/></metadata>
</package>"#;
        let doc = parse(content).unwrap();
        let package = doc.root_element().unwrap();
        assert_eq!(package.space, namespace::OPF);

        let title = package.find_first("title").unwrap();
        assert_eq!(title.space, namespace::DC);
        assert_eq!(title.attr_ns(namespace::XML, "lang"), Some("en"));
        assert_eq!(title.attrs[0].prefix.as_deref(), Some("xml"));

        let unbound = package.find_first("y").unwrap();
        assert_eq!(unbound.space, "x");

        let decl = package
            .attrs
            .iter()
            .find(|a| a.local == "dc")
            .unwrap();
        assert_eq!(decl.space, "xmlns");
        let default_decl = package.attrs.iter().find(|a| a.local == "xmlns").unwrap();
        assert_eq!(default_decl.space, "");
    }

    #[test]
    fn test_default_namespace_skips_attributes() {
        let doc = parse(br#"<html xmlns="http://www.w3.org/1999/xhtml" lang="en"/>"#).unwrap();
        let html = doc.root_element().unwrap();
        assert_eq!(html.space, namespace::XHTML);
        assert_eq!(html.attr("lang"), Some("en"));
    }

    #[test]
    fn test_epub_type_lookup() {
        let doc = parse(
            br#"<html xmlns:epub="http://www.idpf.org/2007/ops"><nav epub:type="toc"/><p epub:type="x"/></html>"#,
        )
        .unwrap();
        let nav = doc.find_first("nav").unwrap();
        assert_eq!(nav.epub_type(), Some("toc"));

        let unbound = parse(br#"<nav epub:type="toc"/>"#).unwrap();
        assert_eq!(unbound.find_first("nav").unwrap().epub_type(), Some("toc"));
    }

    #[test]
    fn test_character_references() {
        let doc = parse(b"<p>&#65;&#x42;&lt;</p>").unwrap();
        assert_eq!(doc.find_first("p").unwrap().text, "AB<");
    }

    #[test]
    fn test_errors() {
        assert!(parse(b"<a><b></a>").is_err());
        assert!(parse(b"<a>").is_err());
        assert!(parse(b"<a x=\"1\" x=\"2\"/>").is_err());
        assert!(parse(b"<p>&nbsp;</p>").is_err());
        assert!(parse(b"</a>").is_err());
    }

    #[test]
    fn test_unclosed_reports_eof() {
        let err = parse(b"<package><metadata>").unwrap_err();
        assert_eq!(err.message, "unexpected EOF");
        assert_eq!(err.offset, 19);
    }

    #[test]
    fn test_find_helpers_document_order() {
        let doc = parse(b"<a><b id=\"1\"><b id=\"2\"/></b><c><b id=\"3\"/></c></a>").unwrap();
        let ids: Vec<_> = doc.find_all("b").iter().filter_map(|n| n.id()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(doc.root_element().unwrap().children_named("c").count(), 1);
    }
}
