//! Accessibility metadata and structure checks (`epub-accessibility`).
//!
//! Every validator here is governed by the session's accessibility level:
//! `ignore` silences the family, `error`/`warning` rewrite each finding's
//! severity. Without a snapshot the intrinsic severities stay.

mod metadata;
mod package;
mod pages;
mod structure;

pub use metadata::MetadataValidator;
pub use package::PackageValidator;
pub use pages::PageValidator;
pub use structure::{StructureValidator, expected_role};

use crate::config::AccessibilityLevel;
use crate::core::Diagnostic;
use crate::workspace::Snapshot;

pub const SOURCE: &str = "epub-accessibility";

/// Run `check` under the snapshot's accessibility level.
fn governed(snapshot: Option<&Snapshot>, check: impl FnOnce() -> Vec<Diagnostic>) -> Vec<Diagnostic> {
    let level = snapshot.map(|s| s.accessibility);
    if level == Some(AccessibilityLevel::Ignore) {
        return Vec::new();
    }

    let mut diags = check();
    if let Some(severity) = level.and_then(AccessibilityLevel::severity) {
        for diag in &mut diags {
            diag.severity = severity;
        }
    }
    diags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Severity;
    use crate::validator::Validator;
    use crate::validator::testutil::{VALID_OPF, snapshot_with};

    const URI: &str = "file:///book/content.opf";

    fn run(level: AccessibilityLevel) -> Vec<Diagnostic> {
        let snap = snapshot_with(&[(URI, VALID_OPF)], level);
        MetadataValidator.validate(URI, VALID_OPF.as_bytes(), Some(&snap))
    }

    #[test]
    fn test_ignore_level_silences() {
        assert!(run(AccessibilityLevel::Ignore).is_empty());
    }

    #[test]
    fn test_level_overrides_severity() {
        let diags = run(AccessibilityLevel::Error);
        assert!(!diags.is_empty());
        assert!(diags.iter().all(|d| d.severity == Severity::Error));

        let diags = run(AccessibilityLevel::Warning);
        assert!(diags.iter().all(|d| d.severity == Severity::Warning));
    }

    #[test]
    fn test_intrinsic_without_snapshot() {
        let diags = MetadataValidator.validate(URI, VALID_OPF.as_bytes(), None);
        assert!(diags.iter().any(|d| d.severity == Severity::Information));
        assert!(diags.iter().any(|d| d.severity == Severity::Warning));
    }
}
