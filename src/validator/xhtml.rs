//! XHTML content document basics: namespace, language, image alternatives.

use super::{Validator, parse_or_report};
use crate::core::{DiagBuilder, Diagnostic, FileKind, namespace};
use crate::parser::XmlNode;
use crate::workspace::Snapshot;

pub const SOURCE: &str = "epub-xhtml";

pub struct XhtmlValidator;

impl Validator for XhtmlValidator {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn kinds(&self) -> &'static [FileKind] {
        &[FileKind::Content, FileKind::Navigation]
    }

    fn validate(&self, _uri: &str, content: &[u8], _snapshot: Option<&Snapshot>) -> Vec<Diagnostic> {
        let doc = match parse_or_report(content) {
            Ok(doc) => doc,
            Err(diags) => return diags,
        };

        let mut diags = check_html_element(content, &doc);
        diags.extend(
            doc.find_all("img")
                .into_iter()
                .filter(|img| !img.has_attr("alt"))
                .map(|img| {
                    DiagBuilder::new(content, img.offset, SOURCE)
                        .code("HTM_008")
                        .warning("<img> element missing alt attribute")
                }),
        );
        diags
    }
}

fn check_html_element(content: &[u8], doc: &XmlNode) -> Vec<Diagnostic> {
    let Some(html) = doc.find_first("html") else {
        return Vec::new();
    };
    let at = || DiagBuilder::new(content, html.offset, SOURCE);
    let mut diags = Vec::new();

    if html.space != namespace::XHTML {
        diags.push(
            at().code("HTM_049")
                .error(r#"missing XHTML namespace (xmlns="http://www.w3.org/1999/xhtml")"#),
        );
    }

    let xml_lang = html.attr_ns(namespace::XML, "lang").unwrap_or_default();
    let lang = html.attr("lang").unwrap_or_default();

    if !xml_lang.is_empty() && !lang.is_empty() && xml_lang != lang {
        diags.push(at().code("HTM_017").warning(format!(
            "xml:lang (\"{xml_lang}\") and lang (\"{lang}\") values don't match"
        )));
    }

    if xml_lang.is_empty() && lang.is_empty() {
        diags.push(at().info("missing lang attribute on <html> element"));
    }

    diags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Severity;
    use crate::validator::testutil::{codes, has_message, xhtml};

    fn run(content: &str) -> Vec<Diagnostic> {
        XhtmlValidator.validate("file:///book/ch1.xhtml", content.as_bytes(), None)
    }

    #[test]
    fn test_valid_document() {
        assert!(run(&xhtml("<p>Hello</p>")).is_empty());
    }

    #[test]
    fn test_missing_namespace() {
        let diags = run(r#"<html lang="en"><body/></html>"#);
        assert_eq!(codes(&diags), ["HTM_049"]);
        assert_eq!(diags[0].range.start.line, 0);
        assert_eq!(diags[0].range.start.character, 0);
    }

    #[test]
    fn test_lang_mismatch() {
        let diags = run(
            r#"<html xmlns="http://www.w3.org/1999/xhtml" lang="en" xml:lang="fr"><body/></html>"#,
        );
        assert_eq!(codes(&diags), ["HTM_017"]);
        assert!(has_message(&diags, r#"xml:lang ("fr") and lang ("en") values don't match"#));
    }

    #[test]
    fn test_missing_lang_is_info() {
        let diags = run(r#"<html xmlns="http://www.w3.org/1999/xhtml"><body/></html>"#);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Information);
        assert!(diags[0].code.is_none());
    }

    #[test]
    fn test_img_alt() {
        let diags = run(&xhtml(r#"<img src="a.png"/><img src="b.png" alt=""/>"#));
        assert_eq!(codes(&diags), ["HTM_008"]);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(diags[0].range.start.line, 3);
        assert_eq!(diags[0].range.start.character, 6);
    }

    #[test]
    fn test_malformed() {
        let diags = run("<html><body></html>");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].source, "epub-xml");
    }
}
