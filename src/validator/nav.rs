//! Navigation document checks: toc presence, remote links, spine order.

use rustc_hash::FxHashMap;

use super::{Validator, parse_or_report};
use crate::core::{DiagBuilder, Diagnostic, FileKind, ManifestInfo, href};
use crate::parser::XmlNode;
use crate::workspace::Snapshot;

pub const SOURCE: &str = "epub-nav";

pub struct NavValidator;

impl Validator for NavValidator {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn kinds(&self) -> &'static [FileKind] {
        &[FileKind::Navigation]
    }

    fn validate(&self, _uri: &str, content: &[u8], snapshot: Option<&Snapshot>) -> Vec<Diagnostic> {
        let doc = match parse_or_report(content) {
            Ok(doc) => doc,
            Err(diags) => return diags,
        };

        let navs = doc.find_all("nav");
        let toc = navs.iter().copied().find(|nav| nav.epub_type() == Some("toc"));
        // Document-level findings sit on <html>, or at the origin without one.
        let html_offset = doc.find_first("html").map_or(0, |html| html.offset);
        let at = |offset| DiagBuilder::new(content, offset, SOURCE);

        let mut diags = Vec::new();

        match toc {
            None => diags.push(
                at(html_offset)
                    .code("NAV_003")
                    .error(r#"no <nav epub:type="toc"> element found"#),
            ),
            Some(toc) if toc.find_first("ol").is_none() => {
                diags.push(at(toc.offset).warning("toc nav is missing required <ol> element"));
            }
            Some(_) => {}
        }

        for link in doc.find_all("a") {
            if let Some(target) = link.attr("href").filter(|h| href::is_remote_url(h)) {
                diags.push(
                    at(link.offset)
                        .code("NAV_010")
                        .error(format!("nav links to remote resource: {target}")),
                );
            }
        }

        let has_secondary = navs
            .iter()
            .any(|nav| matches!(nav.epub_type(), Some("page-list" | "landmarks")));
        if !has_secondary {
            diags.push(at(html_offset).info("navigation document has no page-list or landmarks nav"));
        }

        if let (Some(toc), Some(manifest)) = (toc, snapshot.and_then(|s| s.manifest.as_ref()))
            && !follows_spine(toc, manifest)
        {
            diags.push(
                at(toc.offset)
                    .code("NAV_011")
                    .warning("TOC link order doesn't match spine order"),
            );
        }

        diags
    }
}

/// TOC links that name spine documents appear in non-decreasing spine order.
fn follows_spine(toc: &XmlNode, manifest: &ManifestInfo) -> bool {
    let spine_index: FxHashMap<&str, usize> = manifest
        .spine_hrefs()
        .into_iter()
        .enumerate()
        .map(|(idx, href)| (href, idx))
        .collect();

    let mut last = None;
    for link in toc.find_all("a") {
        let Some(target) = link.attr("href").filter(|h| !h.is_empty()) else {
            continue;
        };
        let Some(&idx) = spine_index.get(href::strip_fragment(target)) else {
            continue;
        };
        if last.is_some_and(|last| idx < last) {
            return false;
        }
        last = Some(idx);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Severity;
    use crate::validator::testutil::{VALID_OPF, codes, has_message, snapshot, xhtml};

    const NAV_URI: &str = "file:///book/nav.xhtml";

    fn nav_doc(toc: &str, extra: &str) -> String {
        xhtml(&format!(
            r#"<nav epub:type="toc"><ol>{toc}</ol></nav>{extra}"#
        ))
    }

    fn run(content: &str, with_manifest: bool) -> Vec<Diagnostic> {
        if with_manifest {
            let snap = snapshot(&[("file:///book/content.opf", VALID_OPF), (NAV_URI, content)]);
            NavValidator.validate(NAV_URI, content.as_bytes(), Some(&snap))
        } else {
            NavValidator.validate(NAV_URI, content.as_bytes(), None)
        }
    }

    const LANDMARKS: &str = r#"<nav epub:type="landmarks"><ol/></nav>"#;

    #[test]
    fn test_valid_nav() {
        let content = nav_doc(
            r#"<li><a href="chapter1.xhtml">1</a></li><li><a href="chapter2.xhtml#s">2</a></li>"#,
            LANDMARKS,
        );
        assert!(run(&content, true).is_empty());
    }

    #[test]
    fn test_missing_toc() {
        let content = xhtml(LANDMARKS);
        let diags = run(&content, false);
        assert_eq!(codes(&diags), ["NAV_003"]);
        assert_eq!(diags[0].range.start.line, 1);
    }

    #[test]
    fn test_toc_without_ol() {
        let content = xhtml(&format!(r#"<nav epub:type="toc"><p/></nav>{LANDMARKS}"#));
        let diags = run(&content, false);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert!(has_message(&diags, "missing required <ol>"));
    }

    #[test]
    fn test_remote_link() {
        let content = nav_doc(r#"<li><a href="https://example.com/">x</a></li>"#, LANDMARKS);
        let diags = run(&content, false);
        assert_eq!(codes(&diags), ["NAV_010"]);
        assert!(has_message(&diags, "https://example.com/"));
    }

    #[test]
    fn test_no_secondary_nav() {
        let content = nav_doc("", "");
        let diags = run(&content, false);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Information);
    }

    #[test]
    fn test_spine_order() {
        let content = nav_doc(
            r#"<li><a href="chapter2.xhtml">2</a></li><li><a href="chapter1.xhtml">1</a></li><li><a href="chapter1.xhtml#b">1b</a></li>"#,
            LANDMARKS,
        );
        assert_eq!(codes(&run(&content, true)), ["NAV_011"]);
        // Order needs the package document.
        assert!(run(&content, false).is_empty());
    }

    #[test]
    fn test_unknown_hrefs_ignored_for_order() {
        let content = nav_doc(
            r#"<li><a href="chapter2.xhtml">2</a></li><li><a href="appendix.xhtml">A</a></li>"#,
            LANDMARKS,
        );
        assert!(run(&content, true).is_empty());
    }
}
