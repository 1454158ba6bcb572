//! Raw-byte tag and element span discovery.
//!
//! Approximate on purpose: these spans only feed cursor containment, never
//! parsing decisions.

/// Offset of the first unquoted `>` at or after `tag_start`.
///
/// Falls back to the last byte of the content on malformed input.
pub fn find_tag_end(content: &[u8], tag_start: usize) -> usize {
    let mut quote: Option<u8> = None;

    for (i, &byte) in content.iter().enumerate().skip(tag_start) {
        match (quote, byte) {
            (Some(q), b) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(byte),
            (None, b'>') => return i,
            (None, _) => {}
        }
    }

    content.len().saturating_sub(1)
}

/// Offset of the `>` that ends the element starting at `tag_start`.
///
/// Self-closing tags end at their own `>`. Otherwise the first `</local`
/// after the start tag wins; without one the start tag's end is used.
pub fn find_element_end(content: &[u8], tag_start: usize, local: &str) -> usize {
    let tag_end = find_tag_end(content, tag_start);
    if tag_end > 0 && content.get(tag_end - 1) == Some(&b'/') {
        return tag_end;
    }

    let needle = format!("</{local}");
    let Some(close) = find_bytes(content, tag_end, needle.as_bytes()) else {
        return tag_end;
    };

    content[close..]
        .iter()
        .position(|&b| b == b'>')
        .map_or(tag_end, |i| close + i)
}

/// First occurrence of `needle` at or after `from`.
pub(crate) fn find_bytes(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tag_end_skips_quoted() {
        let content = br#"<a title="x>y" b='>'>text</a>"#;
        assert_eq!(find_tag_end(content, 0), 20);
    }

    #[test]
    fn test_find_tag_end_fallback() {
        let content = b"<a title=\"unterminated>";
        assert_eq!(find_tag_end(content, 0), content.len() - 1);
        assert_eq!(find_tag_end(b"", 0), 0);
    }

    #[test]
    fn test_find_element_end() {
        let content = b"<root><child>text</child></root>";
        assert_eq!(find_element_end(content, 6, "child"), 24);
        assert_eq!(find_element_end(content, 0, "root"), 31);
    }

    #[test]
    fn test_find_element_end_self_closing() {
        let content = b"<root><img src=\"a.png\"/></root>";
        assert_eq!(find_element_end(content, 6, "img"), 23);
    }

    #[test]
    fn test_find_element_end_missing_close() {
        let content = b"<p>text";
        assert_eq!(find_element_end(content, 0, "p"), 2);
    }
}
