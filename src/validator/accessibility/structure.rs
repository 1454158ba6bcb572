use rustc_hash::FxHashSet;

use super::{SOURCE, governed};
use crate::core::{DiagBuilder, Diagnostic, FileKind, href};
use crate::parser::{XmlNode, parse};
use crate::validator::Validator;
use crate::workspace::Snapshot;

/// `epub:type` structural semantics and the ARIA role each one implies.
pub const EPUB_TYPE_ROLES: &[(&str, &str)] = &[
    ("abstract", "doc-abstract"),
    ("acknowledgments", "doc-acknowledgments"),
    ("afterword", "doc-afterword"),
    ("appendix", "doc-appendix"),
    ("biblioentry", "doc-biblioentry"),
    ("bibliography", "doc-bibliography"),
    ("biblioref", "doc-biblioref"),
    ("chapter", "doc-chapter"),
    ("colophon", "doc-colophon"),
    ("conclusion", "doc-conclusion"),
    ("cover", "doc-cover"),
    ("credit", "doc-credit"),
    ("credits", "doc-credits"),
    ("dedication", "doc-dedication"),
    ("endnote", "doc-endnote"),
    ("endnotes", "doc-endnotes"),
    ("epigraph", "doc-epigraph"),
    ("epilogue", "doc-epilogue"),
    ("errata", "doc-errata"),
    ("footnote", "doc-footnote"),
    ("foreword", "doc-foreword"),
    ("glossary", "doc-glossary"),
    ("glossdef", "definition"),
    ("glossref", "doc-glossref"),
    ("glossterm", "term"),
    ("index", "doc-index"),
    ("introduction", "doc-introduction"),
    ("noteref", "doc-noteref"),
    ("notice", "doc-notice"),
    ("pagebreak", "doc-pagebreak"),
    ("page-list", "doc-pagelist"),
    ("part", "doc-part"),
    ("preface", "doc-preface"),
    ("prologue", "doc-prologue"),
    ("pullquote", "doc-pullquote"),
    ("qna", "doc-qna"),
    ("subtitle", "doc-subtitle"),
    ("tip", "doc-tip"),
    ("toc", "doc-toc"),
];

/// ARIA role expected for an `epub:type` token.
pub fn expected_role(token: &str) -> Option<&'static str> {
    EPUB_TYPE_ROLES
        .iter()
        .find(|(epub_type, _)| *epub_type == token)
        .map(|(_, role)| *role)
}

/// Input types that never need a label.
const UNLABELED_INPUTS: &[&str] = &["hidden", "submit", "button", "reset", "image"];

/// Semantic markup in content documents.
pub struct StructureValidator;

impl Validator for StructureValidator {
    fn name(&self) -> &'static str {
        "epub-accessibility-structure"
    }

    fn kinds(&self) -> &'static [FileKind] {
        &[FileKind::Content, FileKind::Navigation]
    }

    fn validate(&self, _uri: &str, content: &[u8], snapshot: Option<&Snapshot>) -> Vec<Diagnostic> {
        governed(snapshot, || {
            let Ok(doc) = parse(content) else {
                return Vec::new();
            };
            let nodes = doc.descendants();

            let mut diags = check_roles(content, &nodes);
            diags.extend(check_page_break_labels(content, &nodes));
            diags.extend(check_headings(content, &nodes));
            diags.extend(check_tables(content, &doc));
            diags.extend(check_form_labels(content, &doc));
            diags
        })
    }
}

fn at(content: &[u8], node: &XmlNode) -> DiagBuilder {
    DiagBuilder::new(content, node.offset, SOURCE)
}

fn check_roles(content: &[u8], nodes: &[&XmlNode]) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    for node in nodes {
        let Some(epub_type) = node.epub_type() else {
            continue;
        };
        let role = node.attr("role").unwrap_or_default();
        for token in epub_type.split_ascii_whitespace() {
            let Some(expected) = expected_role(token) else {
                continue;
            };
            if !href::contains_token(role, expected) {
                diags.push(at(content, node).code("epub-type-has-matching-role").warning(format!(
                    "epub:type=\"{token}\" should have role=\"{expected}\""
                )));
            }
        }
    }
    diags
}

fn check_page_break_labels(content: &[u8], nodes: &[&XmlNode]) -> Vec<Diagnostic> {
    nodes
        .iter()
        .filter(|node| node.epub_type().is_some_and(|t| href::contains_token(t, "pagebreak")))
        .filter(|node| {
            node.attr("aria-label").is_none_or(str::is_empty)
                && node.attr("title").is_none_or(str::is_empty)
                && node.text.trim().is_empty()
        })
        .map(|node| {
            at(content, node).code("pagebreak-label").warning(
                "pagebreak element missing accessible label (aria-label, title, or text content)",
            )
        })
        .collect()
}

fn heading_level(local: &str) -> Option<u8> {
    match local.as_bytes() {
        [b'h', level @ b'1'..=b'6'] => Some(level - b'0'),
        _ => None,
    }
}

fn check_headings(content: &[u8], nodes: &[&XmlNode]) -> Vec<Diagnostic> {
    let headings: Vec<(u8, &XmlNode)> = nodes
        .iter()
        .filter_map(|node| heading_level(&node.local).map(|level| (level, *node)))
        .collect();

    headings
        .windows(2)
        .filter(|pair| pair[1].0 > pair[0].0 + 1)
        .map(|pair| {
            let (prev, (level, node)) = (pair[0].0, pair[1]);
            at(content, node)
                .code("heading-order")
                .warning(format!("heading level skipped from h{prev} to h{level}"))
        })
        .collect()
}

fn check_tables(content: &[u8], doc: &XmlNode) -> Vec<Diagnostic> {
    doc.find_all("table")
        .into_iter()
        .filter(|table| {
            table.find_first("caption").is_none()
                && table.attr("aria-label").is_none_or(str::is_empty)
                && table.attr("aria-labelledby").is_none_or(str::is_empty)
        })
        .map(|table| {
            at(content, table)
                .code("table-caption")
                .warning("<table> missing <caption>, aria-label, or aria-labelledby")
        })
        .collect()
}

fn check_form_labels(content: &[u8], doc: &XmlNode) -> Vec<Diagnostic> {
    let labelled: FxHashSet<&str> = doc
        .find_all("label")
        .into_iter()
        .filter_map(|label| label.attr("for").filter(|f| !f.is_empty()))
        .collect();

    let has_label = |field: &XmlNode| {
        ["aria-label", "aria-labelledby", "title"]
            .iter()
            .any(|attr| field.attr(attr).is_some_and(|v| !v.is_empty()))
            || field.id().is_some_and(|id| labelled.contains(id))
    };

    let inputs = doc
        .find_all("input")
        .into_iter()
        .filter(|input| !UNLABELED_INPUTS.contains(&input.attr("type").unwrap_or_default()));
    let fields = inputs.chain(doc.find_all("select")).chain(doc.find_all("textarea"));

    fields
        .filter(|field| !has_label(*field))
        .map(|field| {
            at(content, field)
                .code("input-label")
                .warning(format!("<{}> missing associated label", field.local))
        })
        .collect()
}
