use super::{SOURCE, governed};
use crate::core::{DiagBuilder, Diagnostic, FileKind, namespace};
use crate::parser::parse;
use crate::validator::Validator;
use crate::workspace::Snapshot;

/// Publication title and language, as accessibility requirements.
pub struct PackageValidator;

impl Validator for PackageValidator {
    fn name(&self) -> &'static str {
        "epub-accessibility-package"
    }

    fn kinds(&self) -> &'static [FileKind] {
        &[FileKind::Manifest]
    }

    fn validate(&self, _uri: &str, content: &[u8], snapshot: Option<&Snapshot>) -> Vec<Diagnostic> {
        governed(snapshot, || {
            let Ok(doc) = parse(content) else {
                return Vec::new();
            };
            let Some(metadata) = doc.find_first("package").and_then(|p| p.find_first("metadata")) else {
                return Vec::new();
            };

            let at = || DiagBuilder::new(content, metadata.offset, SOURCE);
            let mut diags = Vec::new();
            if metadata.find_first_ns(namespace::DC, "title").is_none() {
                diags.push(at().code("epub-title").error("missing publication title (dc:title)"));
            }
            if metadata.find_first_ns(namespace::DC, "language").is_none() {
                diags.push(at().code("epub-lang").error("missing language in OPF (dc:language)"));
            }
            diags
        })
    }
}
