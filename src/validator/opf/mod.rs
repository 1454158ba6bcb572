//! Package document (`.opf`) validation.

mod manifest;
mod metadata;
mod spine;

use super::{Validator, parse_or_report};
use crate::core::{Diagnostic, FileKind};
use crate::workspace::Snapshot;

pub const SOURCE: &str = "epub-opf";

pub struct OpfValidator;

impl Validator for OpfValidator {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn kinds(&self) -> &'static [FileKind] {
        &[FileKind::Manifest]
    }

    fn validate(&self, _uri: &str, content: &[u8], _snapshot: Option<&Snapshot>) -> Vec<Diagnostic> {
        let doc = match parse_or_report(content) {
            Ok(doc) => doc,
            Err(diags) => return diags,
        };
        let Some(package) = doc.find_first("package") else {
            return Vec::new();
        };

        let mut diags = metadata::check(content, package);
        diags.extend(manifest::check(content, package));
        diags.extend(spine::check(content, package));
        diags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::testutil::{VALID_OPF, codes, has_message};

    fn run(content: &str) -> Vec<Diagnostic> {
        OpfValidator.validate("file:///book/content.opf", content.as_bytes(), None)
    }

    #[test]
    fn test_valid_package() {
        assert!(run(VALID_OPF).is_empty());
    }

    #[test]
    fn test_malformed() {
        let diags = run("<package><metadata></package>");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].source, "epub-xml");
    }

    #[test]
    fn test_not_a_package() {
        assert!(run("<html/>").is_empty());
    }

    #[test]
    fn test_missing_metadata() {
        let diags = run(r#"<package><manifest/><spine/></package>"#);
        assert_eq!(codes(&diags), ["OPF_030"]);
        assert!(has_message(&diags, "missing required <metadata> element"));
    }

    #[test]
    fn test_missing_dc_elements() {
        let diags = run(
            r#"<package xmlns:dc="http://purl.org/dc/elements/1.1/"><metadata/><manifest/><spine/></package>"#,
        );
        assert_eq!(codes(&diags), ["OPF_030", "OPF_032", "OPF_034"]);
    }

    #[test]
    fn test_unique_identifier_mismatch() {
        let content = VALID_OPF.replace(r#"unique-identifier="uid""#, r#"unique-identifier="other""#);
        let diags = run(&content);
        assert_eq!(codes(&diags), ["OPF_031"]);
        assert!(has_message(&diags, r#"unique-identifier "other" does not match"#));
    }

    #[test]
    fn test_manifest_items() {
        let content = VALID_OPF.replace(
            r#"<item id="ch2" href="chapter2.xhtml" media-type="application/xhtml+xml"/>"#,
            r#"<item id="ch1" href="" />"#,
        );
        let diags = run(&content);
        assert_eq!(codes(&diags), ["OPF_025", "OPF_003"]);
        assert!(has_message(&diags, "manifest item href is empty"));
        assert!(has_message(&diags, r#"duplicate manifest item id: "ch1""#));
        assert!(has_message(&diags, r#"nonexistent manifest id: "ch2""#));
    }

    #[test]
    fn test_missing_spine() {
        let content = VALID_OPF.replace("<spine>", "<!--").replace("</spine>", "-->");
        let diags = run(&content);
        assert_eq!(codes(&diags), ["OPF_019"]);
    }
}
