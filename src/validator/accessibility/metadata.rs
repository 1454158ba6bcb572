use rustc_hash::FxHashSet;

use super::{SOURCE, governed};
use crate::core::manifest::{
    ACCESS_MODE, ACCESS_MODE_SUFFICIENT, ACCESSIBILITY_FEATURE, ACCESSIBILITY_HAZARD,
    ACCESSIBILITY_SUMMARY,
};
use crate::core::{DiagBuilder, Diagnostic, FileKind};
use crate::parser::{XmlNode, parse};
use crate::validator::Validator;
use crate::workspace::Snapshot;

pub const ACCESS_MODES: &[&str] = &[
    "auditory",
    "chartOnVisual",
    "chemOnVisual",
    "colorDependent",
    "diagramOnVisual",
    "mathOnVisual",
    "musicOnVisual",
    "tactile",
    "textOnVisual",
    "textual",
    "visual",
];

pub const FEATURES: &[&str] = &[
    "alternativeText",
    "annotations",
    "audioDescription",
    "bookmarks",
    "braille",
    "captions",
    "ChemML",
    "describedMath",
    "displayTransformability",
    "displayTransformability/font-size",
    "displayTransformability/font-family",
    "displayTransformability/line-height",
    "displayTransformability/word-spacing",
    "displayTransformability/letter-spacing",
    "displayTransformability/color",
    "displayTransformability/background-color",
    "highContrastAudio",
    "highContrastDisplay",
    "index",
    "largePrint",
    "latex",
    "longDescription",
    "MathML",
    "none",
    "printPageNumbers",
    "readingOrder",
    "rubyAnnotations",
    "signLanguage",
    "structuralNavigation",
    "synchronizedAudioText",
    "tableOfContents",
    "taggedPDF",
    "tactileGraphic",
    "tactileObject",
    "timingControl",
    "transcript",
    "ttsMarkup",
    "unlocked",
    "ARIA",
    "fullRubyAnnotations",
    "pageBreakMarkers",
    "pageNavigation",
];

pub const HAZARDS: &[&str] = &[
    "flashing",
    "noFlashingHazard",
    "motionSimulation",
    "noMotionSimulationHazard",
    "sound",
    "noSoundHazard",
    "none",
    "unknown",
];

/// Each "no hazard" declaration and the hazard it rules out.
const CONTRADICTIONS: &[(&str, &str)] = &[
    ("noFlashingHazard", "flashing"),
    ("noMotionSimulationHazard", "motionSimulation"),
    ("noSoundHazard", "sound"),
];

/// schema.org accessibility metadata in the package document.
pub struct MetadataValidator;

impl Validator for MetadataValidator {
    fn name(&self) -> &'static str {
        "epub-accessibility-metadata"
    }

    fn kinds(&self) -> &'static [FileKind] {
        &[FileKind::Manifest]
    }

    fn validate(&self, _uri: &str, content: &[u8], snapshot: Option<&Snapshot>) -> Vec<Diagnostic> {
        governed(snapshot, || {
            let Ok(doc) = parse(content) else {
                return Vec::new();
            };
            doc.find_first("package")
                .and_then(|package| package.find_first("metadata"))
                .map(|metadata| check(content, metadata))
                .unwrap_or_default()
        })
    }
}

#[derive(Default)]
struct Declared<'a> {
    modes: usize,
    sufficient: usize,
    features: usize,
    summary: bool,
    hazards: FxHashSet<&'a str>,
}

fn check(content: &[u8], metadata: &XmlNode) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let mut declared = Declared::default();

    for meta in metadata.children_named("meta") {
        let value = meta.text.trim();
        let invalid = |code, what| {
            DiagBuilder::new(content, meta.offset, SOURCE)
                .code(code)
                .error(format!("invalid {what} value: \"{value}\""))
        };

        match meta.attr("property").unwrap_or_default() {
            ACCESS_MODE => {
                declared.modes += 1;
                if !ACCESS_MODES.contains(&value) {
                    diags.push(invalid("metadata-accessmode-invalid", "access mode"));
                }
            }
            ACCESS_MODE_SUFFICIENT => declared.sufficient += 1,
            ACCESSIBILITY_FEATURE => {
                declared.features += 1;
                if !FEATURES.contains(&value) {
                    diags.push(invalid("metadata-accessibilityfeature-invalid", "accessibility feature"));
                }
            }
            ACCESSIBILITY_HAZARD => {
                declared.hazards.insert(value);
                if !HAZARDS.contains(&value) {
                    diags.push(invalid("metadata-accessibilityhazard-invalid", "accessibility hazard"));
                }
            }
            ACCESSIBILITY_SUMMARY => declared.summary = true,
            _ => {}
        }
    }

    let at = || DiagBuilder::new(content, metadata.offset, SOURCE);
    let missing = |code, property| at().code(code).warning(format!("missing {property} metadata"));

    if declared.modes == 0 {
        diags.push(missing("metadata-accessmode", ACCESS_MODE));
    }
    if declared.features == 0 {
        diags.push(missing("metadata-accessibilityfeature", ACCESSIBILITY_FEATURE));
    }
    if declared.hazards.is_empty() {
        diags.push(missing("metadata-accessibilityhazard", ACCESSIBILITY_HAZARD));
    }
    if !declared.summary {
        diags.push(
            at().code("metadata-accessibilitysummary")
                .info(format!("missing {ACCESSIBILITY_SUMMARY} metadata")),
        );
    }
    if declared.sufficient == 0 {
        diags.push(missing("metadata-accessmodesufficient", ACCESS_MODE_SUFFICIENT));
    }

    for (absent, hazard) in CONTRADICTIONS {
        if declared.hazards.contains(absent) && declared.hazards.contains(hazard) {
            diags.push(
                at().code("metadata-accessibilityhazard-invalid")
                    .error(format!("contradictory hazard values: \"{absent}\" and \"{hazard}\"")),
            );
        }
    }

    diags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Severity;
    use crate::validator::testutil::{codes, has_code, has_message};

    fn opf(meta: &str) -> String {
        format!(
            r#"<package xmlns="http://www.idpf.org/2007/opf" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <metadata>
    <dc:title>T</dc:title>
{meta}
  </metadata>
</package>"#
        )
    }

    const COMPLETE: &str = r#"    <meta property="schema:accessMode">textual</meta>
    <meta property="schema:accessModeSufficient">textual</meta>
    <meta property="schema:accessibilityFeature">structuralNavigation</meta>
    <meta property="schema:accessibilityHazard">none</meta>
    <meta property="schema:accessibilitySummary">Fine.</meta>"#;

    fn run(content: &str) -> Vec<Diagnostic> {
        MetadataValidator.validate("file:///p.opf", content.as_bytes(), None)
    }

    #[test]
    fn test_complete_metadata() {
        assert!(run(&opf(COMPLETE)).is_empty());
    }

    #[test]
    fn test_all_missing() {
        let diags = run(&opf(""));
        assert_eq!(
            codes(&diags),
            [
                "metadata-accessmode",
                "metadata-accessibilityfeature",
                "metadata-accessibilityhazard",
                "metadata-accessibilitysummary",
                "metadata-accessmodesufficient",
            ]
        );
        assert_eq!(diags[3].severity, Severity::Information);
        assert!(diags.iter().all(|d| d.range.start.line == 1));
    }

    #[test]
    fn test_invalid_values() {
        let meta = COMPLETE
            .replace(">textual</meta>\n    <meta property=\"schema:accessModeSufficient\"", ">smell</meta>\n    <meta property=\"schema:accessModeSufficient\"")
            .replace("structuralNavigation", "telepathy")
            .replace(">none<", ">loud<");
        let diags = run(&opf(&meta));
        assert_eq!(
            codes(&diags),
            [
                "metadata-accessmode-invalid",
                "metadata-accessibilityfeature-invalid",
                "metadata-accessibilityhazard-invalid",
            ]
        );
        assert!(has_message(&diags, r#"invalid access mode value: "smell""#));
        assert!(diags.iter().all(|d| d.severity == Severity::Error));
        assert_eq!(diags[0].range.start.line, 3);
    }

    #[test]
    fn test_contradictory_hazards() {
        let meta = format!(
            "{COMPLETE}\n    <meta property=\"schema:accessibilityHazard\">noFlashingHazard</meta>\n    <meta property=\"schema:accessibilityHazard\">flashing</meta>"
        );
        let diags = run(&opf(&meta));
        assert!(has_code(&diags, "metadata-accessibilityhazard-invalid"));
        assert!(has_message(
            &diags,
            r#"contradictory hazard values: "noFlashingHazard" and "flashing""#
        ));
    }

    #[test]
    fn test_malformed_is_silent() {
        assert!(run("<package><metadata>").is_empty());
    }
}
