//! Stylesheet restrictions for EPUB reading systems.

use super::Validator;
use crate::core::{DiagBuilder, Diagnostic, FileKind, Range};
use crate::parser::css::{PropertyDecl, SOURCE, scan_css};
use crate::workspace::Snapshot;

const FONT_FORMATS: &[&str] = &["woff", "woff2", "opentype", "truetype", "embedded-opentype"];
const FONT_EXTENSIONS: &[&str] = &[".woff", ".woff2", ".otf", ".ttf"];

pub struct CssValidator;

impl Validator for CssValidator {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn kinds(&self) -> &'static [FileKind] {
        &[FileKind::Stylesheet]
    }

    fn validate(&self, _uri: &str, content: &[u8], _snapshot: Option<&Snapshot>) -> Vec<Diagnostic> {
        let scan = scan_css(content);
        let mut diags = scan.diagnostics;

        diags.extend(scan.properties.iter().filter_map(check_property));

        let first_font_face = scan
            .at_rules
            .iter()
            .filter(|rule| rule.name == "@font-face")
            .map(|rule| rule.offset)
            .min();
        if let Some(start) = first_font_face {
            diags.extend(
                scan.properties
                    .iter()
                    .filter(|decl| decl.property == "src" && decl.offset >= start)
                    .filter_map(check_font_src),
            );
        }

        diags
    }
}

fn at(decl: &PropertyDecl) -> DiagBuilder {
    DiagBuilder::at_range(Range::point(decl.pos), SOURCE)
}

fn check_property(decl: &PropertyDecl) -> Option<Diagnostic> {
    match (decl.property.as_str(), decl.value.trim()) {
        (name @ ("direction" | "unicode-bidi"), _) => Some(at(decl).code("CSS_001").error(format!(
            "CSS property \"{name}\" must not be used in EPUB content documents"
        ))),
        ("position", "fixed") => Some(
            at(decl)
                .code("CSS_006")
                .warning("position: fixed is not well supported in EPUB reading systems"),
        ),
        ("position", "absolute") => Some(
            at(decl)
                .code("CSS_017")
                .warning("position: absolute may not be well supported in EPUB reading systems"),
        ),
        _ => None,
    }
}

/// Inner text of the first `name(...)` call in `value`.
fn call_argument<'a>(value: &'a str, name: &str) -> Option<&'a str> {
    let start = value.find(name)? + name.len();
    let len = value[start..].find(')')?;
    Some(value[start..start + len].trim_matches(['"', '\'', ' ']))
}

fn check_font_src(decl: &PropertyDecl) -> Option<Diagnostic> {
    let value = decl.value.to_ascii_lowercase();

    if value.contains("format(") {
        let format = call_argument(&value, "format(")?;
        return (!FONT_FORMATS.contains(&format)).then(|| {
            at(decl)
                .code("CSS_007")
                .warning(format!("non-standard font format: \"{format}\""))
        });
    }

    let url = call_argument(&value, "url(")?;
    let known = FONT_EXTENSIONS.iter().any(|ext| url.ends_with(ext));
    (!url.is_empty() && !known).then(|| {
        at(decl)
            .code("CSS_007")
            .warning("non-standard font type in @font-face src")
    })
}
