//! Shared fixtures for validator tests.

use std::sync::Arc;

use crate::config::AccessibilityLevel;
use crate::core::Diagnostic;
use crate::workspace::Snapshot;

/// Snapshot over in-memory files with the default accessibility level.
pub(crate) fn snapshot(files: &[(&str, &str)]) -> Snapshot {
    snapshot_with(files, AccessibilityLevel::default())
}

pub(crate) fn snapshot_with(files: &[(&str, &str)], level: AccessibilityLevel) -> Snapshot {
    Snapshot::from_files(
        files
            .iter()
            .map(|(uri, content)| (uri.to_string(), Arc::from(content.as_bytes()))),
        None,
        level,
    )
}

pub(crate) fn codes(diags: &[Diagnostic]) -> Vec<&str> {
    diags.iter().filter_map(|d| d.code).collect()
}

pub(crate) fn has_code(diags: &[Diagnostic], code: &str) -> bool {
    diags.iter().any(|d| d.has_code(code))
}

pub(crate) fn has_message(diags: &[Diagnostic], needle: &str) -> bool {
    diags.iter().any(|d| d.message.contains(needle))
}

/// Complete, valid package document with two spine entries.
pub(crate) const VALID_OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" xmlns:dc="http://purl.org/dc/elements/1.1/" version="3.0" unique-identifier="uid">
  <metadata>
    <dc:identifier id="uid">urn:uuid:12345</dc:identifier>
    <dc:title>Test Book</dc:title>
    <dc:language>en</dc:language>
    <meta property="dcterms:modified">2024-01-01T00:00:00Z</meta>
  </metadata>
  <manifest>
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
    <item id="ch1" href="chapter1.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch2" href="chapter2.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine>
    <itemref idref="ch1"/>
    <itemref idref="ch2"/>
  </spine>
</package>"#;

/// Minimal XHTML content document.
pub(crate) fn xhtml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang="en" xml:lang="en">
<head><title>T</title></head>
<body>{body}</body>
</html>"#
    )
}
