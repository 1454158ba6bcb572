//! Quick fixes and `source.fixAll`.

use std::collections::HashMap;

use tower_lsp::lsp_types::{
    CodeAction, CodeActionContext, CodeActionKind, Diagnostic, Range, TextEdit, Url, WorkspaceEdit,
};

use super::convert;
use crate::core::manifest::{
    ACCESS_MODE, ACCESS_MODE_SUFFICIENT, ACCESSIBILITY_FEATURE, ACCESSIBILITY_HAZARD,
    ACCESSIBILITY_SUMMARY,
};
use crate::core::{offset_to_position, offsets_to_range, position_to_offset};
use crate::parser::attr::locate_attribute;
use crate::parser::span::{find_bytes, find_tag_end};
use crate::parser::{XmlAttr, XmlNode, locate, parse};
use crate::workspace::WorkspaceStore;

/// `(code, property, placeholder value)` for missing accessibility metadata.
const META_FIXES: &[(&str, &str, &str)] = &[
    ("metadata-accessmode", ACCESS_MODE, "textual"),
    ("metadata-accessmodesufficient", ACCESS_MODE_SUFFICIENT, "textual"),
    ("metadata-accessibilityfeature", ACCESSIBILITY_FEATURE, "structuralNavigation"),
    ("metadata-accessibilityhazard", ACCESSIBILITY_HAZARD, "none"),
    (
        "metadata-accessibilitysummary",
        ACCESSIBILITY_SUMMARY,
        "This publication meets WCAG 2.0 Level AA.",
    ),
];

pub fn code_actions(
    store: &WorkspaceStore,
    uri: &str,
    range: Range,
    context: &CodeActionContext,
) -> Vec<CodeAction> {
    let (Some(content), Ok(url)) = (store.content(uri), Url::parse(uri)) else {
        return Vec::new();
    };

    let fix_all = context
        .only
        .as_ref()
        .is_some_and(|only| only.contains(&CodeActionKind::SOURCE_FIX_ALL));
    if fix_all {
        return fix_all_action(store, uri, &content, url).into_iter().collect();
    }

    let diagnostics = if context.diagnostics.is_empty() {
        stored(store, uri)
            .into_iter()
            .filter(|d| overlaps(d.range, range))
            .collect()
    } else {
        context.diagnostics.clone()
    };

    diagnostics
        .into_iter()
        .filter_map(|diag| {
            let (title, edit) = fix(&content, &diag)?;
            Some(CodeAction {
                title,
                kind: Some(CodeActionKind::QUICKFIX),
                diagnostics: Some(vec![diag]),
                edit: Some(workspace_edit(url.clone(), vec![edit])),
                ..Default::default()
            })
        })
        .collect()
}

fn fix_all_action(store: &WorkspaceStore, uri: &str, content: &[u8], url: Url) -> Option<CodeAction> {
    let mut edits = Vec::new();
    let mut fixed = Vec::new();
    for diag in stored(store, uri) {
        if let Some((_, edit)) = fix(content, &diag) {
            edits.push(edit);
            fixed.push(diag);
        }
    }
    if edits.is_empty() {
        return None;
    }

    Some(CodeAction {
        title: "Fix all auto-fixable issues".to_string(),
        kind: Some(CodeActionKind::SOURCE_FIX_ALL),
        diagnostics: Some(fixed),
        edit: Some(workspace_edit(url, edits)),
        ..Default::default()
    })
}

fn stored(store: &WorkspaceStore, uri: &str) -> Vec<Diagnostic> {
    store.diagnostics(uri).iter().map(convert::to_lsp_diagnostic).collect()
}

fn overlaps(a: Range, b: Range) -> bool {
    a.start.line <= b.end.line && a.end.line >= b.start.line
}

fn workspace_edit(url: Url, edits: Vec<TextEdit>) -> WorkspaceEdit {
    WorkspaceEdit {
        changes: Some(HashMap::from([(url, edits)])),
        ..Default::default()
    }
}

/// Title and edit for one auto-fixable diagnostic.
fn fix(content: &[u8], diag: &Diagnostic) -> Option<(String, TextEdit)> {
    let code = convert::diagnostic_code(diag)?;

    if let Some((_, property, value)) = META_FIXES.iter().find(|(c, ..)| *c == code) {
        let edit = insert_meta(content, property, value)?;
        return Some((format!("Add {property} metadata"), edit));
    }

    let offset = position_to_offset(content, convert::from_lsp_position(diag.range.start))?;
    match code {
        "HTM_008" => {
            let edit = add_attribute(content, offset, "alt", "")?;
            Some(("Add alt attribute".to_string(), edit))
        }
        "epub-type-has-matching-role" => {
            let role = role_from_message(&diag.message)?;
            let edit = add_role(content, offset, role)?;
            Some((format!("Add role=\"{role}\" attribute"), edit))
        }
        _ => None,
    }
}

fn insert(content: &[u8], offset: usize, text: String) -> TextEdit {
    let pos = convert::to_lsp_position(offset_to_position(content, offset));
    TextEdit::new(Range::new(pos, pos), text)
}

fn line_start(content: &[u8], offset: usize) -> usize {
    content[..offset]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1)
}

/// Leading whitespace of the line holding `offset`, if only whitespace precedes it.
fn indentation(content: &[u8], offset: usize) -> Option<String> {
    let prefix = &content[line_start(content, offset)..offset];
    prefix
        .iter()
        .all(|b| matches!(b, b' ' | b'\t'))
        .then(|| String::from_utf8_lossy(prefix).into_owned())
}

/// `<meta property=..>` before `</metadata>`, indented like its siblings.
fn insert_meta(content: &[u8], property: &str, value: &str) -> Option<TextEdit> {
    let root = parse(content).ok()?;
    let metadata = root.find_first("metadata")?;
    let closing = format!("</{}", metadata.qualified_name());
    let close = find_bytes(content, metadata.offset, closing.as_bytes())?;
    let element = format!("<meta property=\"{property}\">{value}</meta>");

    let Some(close_indent) = indentation(content, close) else {
        return Some(insert(content, close, element));
    };
    let indent = metadata
        .children
        .first()
        .and_then(|child| indentation(content, child.offset))
        .unwrap_or_else(|| format!("{close_indent}  "));
    Some(insert(content, line_start(content, close), format!("{indent}{element}\n")))
}

/// ` name="value"` right before the start tag's `>` or `/>`.
fn add_attribute(content: &[u8], tag_start: usize, name: &str, value: &str) -> Option<TextEdit> {
    let tag_end = find_tag_end(content, tag_start);
    if content.get(tag_end) != Some(&b'>') {
        return None;
    }
    let at = if tag_end > tag_start && content[tag_end - 1] == b'/' {
        tag_end - 1
    } else {
        tag_end
    };
    Some(insert(content, at, format!(" {name}=\"{value}\"")))
}

/// Append to an existing `role` list, or add the attribute.
fn add_role(content: &[u8], tag_start: usize, role: &str) -> Option<TextEdit> {
    let root = parse(content).ok()?;
    let node = locate(&root, content, tag_start)?.node;
    let existing = node.attrs.iter().find(|a| a.space.is_empty() && a.local == "role");

    match existing {
        Some(attr) => replace_value(content, node, attr, role),
        None => add_attribute(content, tag_start, "role", role),
    }
}

fn replace_value(
    content: &[u8],
    node: &XmlNode,
    attr: &XmlAttr,
    role: &str,
) -> Option<TextEdit> {
    let span = locate_attribute(content, node, attr)?;
    let range = offsets_to_range(content, span.value_start, span.value_end);
    let value = match attr.value.trim() {
        "" => role.to_string(),
        current => format!("{current} {role}"),
    };
    Some(TextEdit::new(convert::to_lsp_range(range), value))
}

/// Expected role quoted in a role diagnostic: `... should have role="doc-x"`.
fn role_from_message(message: &str) -> Option<&str> {
    let (_, rest) = message.rsplit_once("role=\"")?;
    rest.split('"').next().filter(|role| !role.is_empty())
}
