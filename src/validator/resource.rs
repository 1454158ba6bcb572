//! Cross-file resource references between the package and content documents.

use super::Validator;
use crate::core::{DiagBuilder, Diagnostic, FileKind, ManifestInfo, href};
use crate::parser::{XmlNode, parse};
use crate::workspace::Snapshot;

pub const SOURCE: &str = "epub-resource";

/// Elements whose `src` (or `href`) names an embedded resource.
const MEDIA_ELEMENTS: &[&str] = &["image", "source", "audio", "video"];

/// Every local manifest `href` resolves to a workspace file.
pub struct ManifestResourceValidator;

impl Validator for ManifestResourceValidator {
    fn name(&self) -> &'static str {
        "epub-resource-manifest"
    }

    fn kinds(&self) -> &'static [FileKind] {
        &[FileKind::Manifest]
    }

    fn validate(&self, uri: &str, content: &[u8], snapshot: Option<&Snapshot>) -> Vec<Diagnostic> {
        let Some(snapshot) = snapshot else {
            return Vec::new();
        };
        // Malformed packages are reported by the package rules.
        let Ok(doc) = parse(content) else {
            return Vec::new();
        };
        let Some(manifest) = doc.find_first("package").and_then(|p| p.find_first("manifest")) else {
            return Vec::new();
        };

        let opf_dir = href::dir_of_uri(uri);

        manifest
            .children_named("item")
            .filter_map(|item| {
                let target = item
                    .attr("href")
                    .filter(|h| !h.is_empty() && !href::is_remote_url(h))?;
                let resolved = href::resolve_href(&opf_dir, target);
                (!snapshot.has_file_matching(&resolved)).then(|| {
                    DiagBuilder::new(content, item.offset, SOURCE)
                        .code("RSC_007")
                        .error(format!("manifest item references missing file: {target}"))
                })
            })
            .collect()
    }
}

/// Resources referenced from content documents are declared in the manifest.
pub struct ContentResourceValidator;

impl Validator for ContentResourceValidator {
    fn name(&self) -> &'static str {
        "epub-resource-content"
    }

    fn kinds(&self) -> &'static [FileKind] {
        &[FileKind::Content, FileKind::Navigation]
    }

    fn validate(&self, uri: &str, content: &[u8], snapshot: Option<&Snapshot>) -> Vec<Diagnostic> {
        let Some(manifest) = snapshot.and_then(|s| s.manifest.as_ref()) else {
            return Vec::new();
        };
        let Ok(doc) = parse(content) else {
            return Vec::new();
        };

        let content_dir = href::dir_of_uri(uri);
        let mut diags = Vec::new();

        for (node, reference) in resource_references(&doc) {
            let reference = href::strip_fragment(reference);
            if reference.is_empty() || declared(manifest, &content_dir, reference) {
                continue;
            }
            diags.push(
                DiagBuilder::new(content, node.offset, SOURCE)
                    .code("RSC_008")
                    .warning(format!("resource not found in manifest: {reference}")),
            );
        }

        diags
    }
}

fn is_external(reference: &str) -> bool {
    href::is_remote_url(reference) || reference.starts_with("data:")
}

/// Local resource references, grouped by element type in reporting order.
fn resource_references(doc: &XmlNode) -> Vec<(&XmlNode, &str)> {
    let mut refs = Vec::new();

    for img in doc.find_all("img") {
        if let Some(src) = img.attr("src").filter(|s| !s.is_empty() && !is_external(s)) {
            refs.push((img, src));
        }
    }

    for link in doc.find_all("link") {
        if let Some(target) = link
            .attr("href")
            .filter(|h| !h.is_empty() && !href::is_remote_url(h))
        {
            refs.push((link, target));
        }
    }

    for name in MEDIA_ELEMENTS {
        for node in doc.find_all(name) {
            let reference = node
                .attr("src")
                .filter(|s| !s.is_empty())
                .or_else(|| node.attr("href"))
                .filter(|s| !s.is_empty() && !is_external(s));
            if let Some(reference) = reference {
                refs.push((node, reference));
            }
        }
    }

    refs
}

fn declared(manifest: &ManifestInfo, content_dir: &str, reference: &str) -> bool {
    let resolved = href::resolve_href(content_dir, reference);
    manifest.items.iter().any(|item| {
        href::path_ends_with(&resolved, &href::decode(&item.href)) || item.href == reference
    })
}
