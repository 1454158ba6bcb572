//! Diagnostic records produced by rule validators.

use std::fmt;

use super::position::{Range, offset_to_position};

/// Diagnostic severity, numbered like the protocol's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

impl Severity {
    pub fn name(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Information => "info",
            Self::Hint => "hint",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One finding for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Stable rule code (e.g. `OPF_030`), absent for uncoded findings.
    pub code: Option<&'static str>,
    pub severity: Severity,
    pub message: String,
    pub range: Range,
    /// Rule family tag (e.g. `epub-opf`).
    pub source: &'static str,
}

impl Diagnostic {
    /// Whether this diagnostic carries the given code.
    #[inline]
    pub fn has_code(&self, code: &str) -> bool {
        self.code == Some(code)
    }
}

/// Builder positioned at a byte offset of a document.
///
/// ```ignore
/// DiagBuilder::new(content, node.offset, SOURCE)
///     .code("OPF_030")
///     .error("missing required <metadata> element")
/// ```
pub struct DiagBuilder {
    range: Range,
    source: &'static str,
    code: Option<&'static str>,
}

impl DiagBuilder {
    /// Zero-width range at `offset`.
    pub fn new(content: &[u8], offset: usize, source: &'static str) -> Self {
        Self {
            range: Range::point(offset_to_position(content, offset)),
            source,
            code: None,
        }
    }

    /// Explicit range.
    pub fn at_range(range: Range, source: &'static str) -> Self {
        Self {
            range,
            source,
            code: None,
        }
    }

    pub fn code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn error(self, message: impl Into<String>) -> Diagnostic {
        self.build(Severity::Error, message)
    }

    pub fn warning(self, message: impl Into<String>) -> Diagnostic {
        self.build(Severity::Warning, message)
    }

    pub fn info(self, message: impl Into<String>) -> Diagnostic {
        self.build(Severity::Information, message)
    }

    pub fn build(self, severity: Severity, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            code: self.code,
            severity,
            message: message.into(),
            range: self.range,
            source: self.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::position::Position;

    #[test]
    fn test_builder_positions_at_offset() {
        let content = b"<a>\n  <b/>\n</a>";
        let diag = DiagBuilder::new(content, 6, "epub-test")
            .code("T_001")
            .warning("something");

        assert_eq!(diag.range.start, Position::new(1, 2));
        assert_eq!(diag.range.start, diag.range.end);
        assert_eq!(diag.severity, Severity::Warning);
        assert!(diag.has_code("T_001"));
        assert_eq!(diag.source, "epub-test");
    }

    #[test]
    fn test_builder_without_code() {
        let diag = DiagBuilder::new(b"", 0, "epub-test").info("note");
        assert_eq!(diag.code, None);
        assert_eq!(diag.severity, Severity::Information);
    }
}
