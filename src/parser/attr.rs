//! Attribute span recovery inside a start tag.
//!
//! The tree only keeps attribute values, so a cursor query re-finds the
//! attribute in the raw tag text. Name and value are verified together and
//! the spelling is namespace-aware, so `a:id="v"` and `b:id="v"` on the same
//! tag resolve to their own occurrences.

use std::borrow::Cow;

use quick_xml::escape::unescape;

use super::span::{find_bytes, find_tag_end};
use super::xml::{XmlAttr, XmlNode};

/// Absolute byte span of one attribute occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrSpan {
    pub name_start: usize,
    /// First byte inside the quotes.
    pub value_start: usize,
    /// Offset of the closing quote.
    pub value_end: usize,
}

impl AttrSpan {
    /// `name="value"`, closing quote included.
    #[inline]
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.name_start && offset <= self.value_end
    }

    /// From the first value byte up to and including the closing quote.
    #[inline]
    pub fn in_value(&self, offset: usize) -> bool {
        offset >= self.value_start && offset <= self.value_end
    }
}

/// `xmlns:prefix="uri"` declarations in a tag, as `(prefix, uri)`.
pub fn namespace_prefixes(tag: &[u8]) -> Vec<(String, String)> {
    const DECL: &[u8] = b"xmlns:";
    let quoted = quoted_mask(tag);
    let mut out = Vec::new();
    let mut from = 0;

    while let Some(idx) = find_bytes(tag, from, DECL) {
        from = idx + DECL.len();
        if quoted[idx] || (idx > 0 && !tag[idx - 1].is_ascii_whitespace()) {
            continue;
        }
        let name_end = tag[from..]
            .iter()
            .position(|&b| b == b'=' || b.is_ascii_whitespace())
            .map_or(tag.len(), |i| from + i);
        let prefix = String::from_utf8_lossy(&tag[from..name_end]).into_owned();
        if let Some((start, end)) = quoted_value(tag, name_end) {
            let uri = String::from_utf8_lossy(&tag[start..end]).into_owned();
            out.push((prefix, uri));
        }
    }

    out
}

/// Relative span of `name="value"` in the tag text, checking both.
///
/// Candidates inside another attribute's quoted value are skipped.
/// Returns `(name_start, value_start, value_end)`.
pub fn find_attribute_in_tag(tag: &[u8], name: &str, value: &str) -> Option<(usize, usize, usize)> {
    let quoted = quoted_mask(tag);
    let mut from = 0;

    while let Some(idx) = find_bytes(tag, from, name.as_bytes()) {
        from = idx + 1;
        if idx == 0 || quoted[idx] || !tag[idx - 1].is_ascii_whitespace() {
            continue;
        }
        let Some((start, end)) = quoted_value(tag, idx + name.len()) else {
            continue;
        };
        if decoded(&tag[start..end]) == value {
            return Some((idx, start, end));
        }
    }

    None
}

/// Spelling of an attribute inside this tag.
///
/// A prefix declared on the tag itself wins, then the prefix used in the
/// source, then the bare local name.
pub fn attr_spelling(tag: &[u8], attr: &XmlAttr) -> String {
    if attr.space.is_empty() {
        return attr.local.clone();
    }
    if attr.space == "xmlns" {
        return format!("xmlns:{}", attr.local);
    }
    if let Some((prefix, _)) = namespace_prefixes(tag)
        .into_iter()
        .find(|(_, uri)| *uri == attr.space)
    {
        return format!("{prefix}:{}", attr.local);
    }
    attr.qualified_name()
}

/// Absolute span of `attr` within `node`'s start tag.
pub fn locate_attribute(content: &[u8], node: &XmlNode, attr: &XmlAttr) -> Option<AttrSpan> {
    if node.offset >= content.len() {
        return None;
    }
    let tag_end = find_tag_end(content, node.offset);
    let tag = &content[node.offset..=tag_end.min(content.len() - 1)];

    let name = attr_spelling(tag, attr);
    find_attribute_in_tag(tag, &name, &attr.value).map(|(name_start, value_start, value_end)| {
        AttrSpan {
            name_start: node.offset + name_start,
            value_start: node.offset + value_start,
            value_end: node.offset + value_end,
        }
    })
}

/// After an attribute name at `pos`: optional whitespace, `=`, optional
/// whitespace and a quoted value. Returns the value interior.
fn quoted_value(tag: &[u8], mut pos: usize) -> Option<(usize, usize)> {
    let skip_ws = |mut p: usize| {
        while tag.get(p).is_some_and(u8::is_ascii_whitespace) {
            p += 1;
        }
        p
    };

    pos = skip_ws(pos);
    if tag.get(pos) != Some(&b'=') {
        return None;
    }
    pos = skip_ws(pos + 1);

    let quote = *tag.get(pos).filter(|q| matches!(q, b'"' | b'\''))?;
    let start = pos + 1;
    let len = tag.get(start..)?.iter().position(|&b| b == quote)?;
    Some((start, start + len))
}

/// Per byte of `tag`: whether it lies inside quotes (quote characters included).
fn quoted_mask(tag: &[u8]) -> Vec<bool> {
    let mut quote: Option<u8> = None;
    tag.iter()
        .map(|&byte| match (quote, byte) {
            (Some(q), b) if b == q => {
                quote = None;
                true
            }
            (Some(_), _) => true,
            (None, b'"' | b'\'') => {
                quote = Some(byte);
                true
            }
            (None, _) => false,
        })
        .collect()
}

fn decoded(raw: &[u8]) -> Cow<'_, str> {
    let text = String::from_utf8_lossy(raw);
    if !text.contains('&') {
        return text;
    }
    match unescape(&text) {
        Ok(value) => Cow::Owned(value.into_owned()),
        Err(_) => text,
    }
}
