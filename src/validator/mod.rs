//! Rule validators and their registry.
//!
//! A validator is a pure function of `(uri, content, snapshot)`: it keeps no
//! state between calls and omits cross-file findings when no snapshot is
//! available.
//!
//! # Module Structure
//!
//! - `opf` - package document structure (`epub-opf`)
//! - `xhtml` - content document basics (`epub-xhtml`)
//! - `nav` - navigation document (`epub-nav`)
//! - `css` - stylesheet restrictions (`epub-css`)
//! - `resource` - manifest/content cross references (`epub-resource`)
//! - `accessibility` - accessibility metadata and structure (`epub-accessibility`)

pub mod accessibility;
pub mod css;
pub mod nav;
pub mod opf;
pub mod resource;
pub mod xhtml;

#[cfg(test)]
pub(crate) mod testutil;

use crate::core::{Diagnostic, FileKind};
use crate::parser::{XmlNode, parse, well_formedness_diagnostic};
use crate::workspace::Snapshot;

/// One family of rules, registered against the file kinds it understands.
pub trait Validator: Send + Sync {
    /// Rule family name, used in logs.
    fn name(&self) -> &'static str;

    fn kinds(&self) -> &'static [FileKind];

    fn validate(&self, uri: &str, content: &[u8], snapshot: Option<&Snapshot>) -> Vec<Diagnostic>;
}

/// Ordered set of validators.
#[derive(Default)]
pub struct Registry {
    validators: Vec<Box<dyn Validator>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All built-in rule families, in reporting order.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(opf::OpfValidator);
        registry.register(xhtml::XhtmlValidator);
        registry.register(nav::NavValidator);
        registry.register(css::CssValidator);
        registry.register(resource::ManifestResourceValidator);
        registry.register(resource::ContentResourceValidator);
        registry.register(accessibility::MetadataValidator);
        registry.register(accessibility::PageValidator);
        registry.register(accessibility::PackageValidator);
        registry.register(accessibility::StructureValidator);
        registry
    }

    pub fn register(&mut self, validator: impl Validator + 'static) {
        self.validators.push(Box::new(validator));
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Run every validator registered for `kind`.
    pub fn validate_file(
        &self,
        uri: &str,
        content: &[u8],
        kind: FileKind,
        snapshot: Option<&Snapshot>,
    ) -> Vec<Diagnostic> {
        self.validators
            .iter()
            .filter(|v| v.kinds().contains(&kind))
            .flat_map(|v| {
                let diags = v.validate(uri, content, snapshot);
                crate::debug!("dispatch"; "{} {}: {}", v.name(), uri, diags.len());
                diags
            })
            .collect()
    }
}

/// Parse a document, or produce the single well-formedness diagnostic.
pub(crate) fn parse_or_report(content: &[u8]) -> Result<XmlNode, Vec<Diagnostic>> {
    parse(content).map_err(|err| vec![well_formedness_diagnostic(content, &err)])
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static [FileKind], &'static str);

    impl Validator for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn kinds(&self) -> &'static [FileKind] {
            self.0
        }

        fn validate(&self, _: &str, content: &[u8], _: Option<&Snapshot>) -> Vec<Diagnostic> {
            vec![crate::core::DiagBuilder::new(content, 0, "test").info(self.1)]
        }
    }

    #[test]
    fn test_registry_filters_by_kind() {
        let mut registry = Registry::new();
        registry.register(Fixed(&[FileKind::Stylesheet], "css"));
        registry.register(Fixed(&[FileKind::Content, FileKind::Navigation], "xhtml"));

        let diags = registry.validate_file("file:///a.css", b"", FileKind::Stylesheet, None);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "css");

        let diags = registry.validate_file("file:///a.png", b"", FileKind::Unknown, None);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_defaults_registered() {
        let registry = Registry::with_defaults();
        assert_eq!(registry.len(), 10);

        let names: Vec<_> = registry.validators.iter().map(|v| v.name()).collect();
        assert_eq!(
            names[6..],
            [
                "epub-accessibility-metadata",
                "epub-accessibility-pages",
                "epub-accessibility-package",
                "epub-accessibility-structure",
            ]
        );
    }

    #[test]
    fn test_malformed_reports_once_per_family() {
        let registry = Registry::with_defaults();
        let diags =
            registry.validate_file("file:///p.opf", b"<package><metadata>", FileKind::Manifest, None);
        let xml: Vec<_> = diags.iter().filter(|d| d.source == "epub-xml").collect();
        assert_eq!(xml.len(), 1);
        assert!(xml[0].message.starts_with("XML well-formedness error: "));
    }
}
