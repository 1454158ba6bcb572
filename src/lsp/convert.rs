//! Conversions between engine types and protocol types.

use tower_lsp::lsp_types::{self as lsp, NumberOrString, Url};

use crate::core::{Diagnostic, Position, Range, Severity, offset_to_position};

#[inline]
fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

pub fn to_lsp_position(pos: Position) -> lsp::Position {
    lsp::Position::new(to_u32(pos.line), to_u32(pos.character))
}

pub fn from_lsp_position(pos: lsp::Position) -> Position {
    Position::new(pos.line as usize, pos.character as usize)
}

pub fn to_lsp_range(range: Range) -> lsp::Range {
    lsp::Range::new(to_lsp_position(range.start), to_lsp_position(range.end))
}

pub fn to_lsp_severity(severity: Severity) -> lsp::DiagnosticSeverity {
    match severity {
        Severity::Error => lsp::DiagnosticSeverity::ERROR,
        Severity::Warning => lsp::DiagnosticSeverity::WARNING,
        Severity::Information => lsp::DiagnosticSeverity::INFORMATION,
        Severity::Hint => lsp::DiagnosticSeverity::HINT,
    }
}

pub fn to_lsp_diagnostic(diag: &Diagnostic) -> lsp::Diagnostic {
    lsp::Diagnostic {
        range: to_lsp_range(diag.range),
        severity: Some(to_lsp_severity(diag.severity)),
        code: diag.code.map(|code| NumberOrString::String(code.to_string())),
        source: Some(diag.source.to_string()),
        message: diag.message.clone(),
        ..Default::default()
    }
}

/// Code of a protocol diagnostic, when it is a string.
pub fn diagnostic_code(diag: &lsp::Diagnostic) -> Option<&str> {
    match &diag.code {
        Some(NumberOrString::String(code)) => Some(code),
        _ => None,
    }
}

/// Zero-width location at a byte offset; `None` for an unparsable URI.
pub fn location_at(uri: &str, content: &[u8], offset: usize) -> Option<lsp::Location> {
    let uri = Url::parse(uri).ok()?;
    let pos = to_lsp_position(offset_to_position(content, offset));
    Some(lsp::Location::new(uri, lsp::Range::new(pos, pos)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DiagBuilder;

    #[test]
    fn test_positions_clamp_to_u32() {
        let pos = to_lsp_position(Position::new(usize::MAX, 3));
        assert_eq!(pos, lsp::Position::new(u32::MAX, 3));
        assert_eq!(from_lsp_position(lsp::Position::new(2, 7)), Position::new(2, 7));
    }

    #[test]
    fn test_diagnostic_fields() {
        let diag = DiagBuilder::new(b"ab\ncd", 4, "epub-css")
            .code("CSS_001")
            .error("no direction");
        let lsp = to_lsp_diagnostic(&diag);

        assert_eq!(lsp.range.start, lsp::Position::new(1, 1));
        assert_eq!(lsp.severity, Some(lsp::DiagnosticSeverity::ERROR));
        assert_eq!(diagnostic_code(&lsp), Some("CSS_001"));
        assert_eq!(lsp.source.as_deref(), Some("epub-css"));
        assert_eq!(lsp.message, "no direction");
    }

    #[test]
    fn test_uncoded_diagnostic() {
        let diag = DiagBuilder::new(b"", 0, "epub-xhtml").info("note");
        let lsp = to_lsp_diagnostic(&diag);
        assert_eq!(lsp.code, None);
        assert_eq!(lsp.severity, Some(lsp::DiagnosticSeverity::INFORMATION));
    }

    #[test]
    fn test_location_requires_valid_uri() {
        assert!(location_at("not a uri", b"", 0).is_none());
        let loc = location_at("file:///b/a.xhtml", b"x\ny", 2).unwrap();
        assert_eq!(loc.range.start, lsp::Position::new(1, 0));
    }
}
