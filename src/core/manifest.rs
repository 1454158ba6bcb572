//! Manifest Info: the cross-file aggregate derived from a package document.

use super::namespace;
use crate::parser::{XmlNode, parse};

/// One `<manifest><item>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
}

/// One `<spine><itemref>`, in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineItem {
    pub idref: String,
    /// `false` only for `linear="no"`.
    pub linear: bool,
}

/// Package metadata relevant to accessibility checks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetadataInfo {
    pub access_modes: Vec<String>,
    pub access_mode_sufficient: Vec<String>,
    pub features: Vec<String>,
    pub hazards: Vec<String>,
    pub summary: Option<String>,
    pub has_dc_source: bool,
    pub has_title: bool,
    pub has_language: bool,
}

impl MetadataInfo {
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestInfo {
    pub items: Vec<ManifestItem>,
    pub spine: Vec<SpineItem>,
    pub metadata: MetadataInfo,
}

pub const ACCESS_MODE: &str = "schema:accessMode";
pub const ACCESS_MODE_SUFFICIENT: &str = "schema:accessModeSufficient";
pub const ACCESSIBILITY_FEATURE: &str = "schema:accessibilityFeature";
pub const ACCESSIBILITY_HAZARD: &str = "schema:accessibilityHazard";
pub const ACCESSIBILITY_SUMMARY: &str = "schema:accessibilitySummary";

impl ManifestInfo {
    /// Parse a package document. `None` if it is malformed or has no `<package>`.
    pub fn parse(content: &[u8]) -> Option<Self> {
        let doc = parse(content).ok()?;
        let package = doc.find_first("package")?;
        Some(Self::from_package(package))
    }

    pub fn from_package(package: &XmlNode) -> Self {
        let items = package
            .find_first("manifest")
            .map(|manifest| {
                manifest
                    .children_named("item")
                    .map(|item| ManifestItem {
                        id: item.attr("id").unwrap_or_default().to_string(),
                        href: item.attr("href").unwrap_or_default().to_string(),
                        media_type: item.attr("media-type").unwrap_or_default().to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let spine = package
            .find_first("spine")
            .map(|spine| {
                spine
                    .children_named("itemref")
                    .map(|itemref| SpineItem {
                        idref: itemref.attr("idref").unwrap_or_default().to_string(),
                        linear: itemref.attr("linear") != Some("no"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let metadata = package
            .find_first("metadata")
            .map(parse_metadata)
            .unwrap_or_default();

        Self {
            items,
            spine,
            metadata,
        }
    }

    pub fn item_by_id(&self, id: &str) -> Option<&ManifestItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Spine hrefs in declared order; unresolved idrefs are skipped.
    pub fn spine_hrefs(&self) -> Vec<&str> {
        self.spine
            .iter()
            .filter_map(|entry| self.item_by_id(&entry.idref))
            .map(|item| item.href.as_str())
            .collect()
    }
}

fn parse_metadata(metadata: &XmlNode) -> MetadataInfo {
    let mut info = MetadataInfo {
        has_title: metadata.find_first_ns(namespace::DC, "title").is_some(),
        has_language: metadata.find_first_ns(namespace::DC, "language").is_some(),
        has_dc_source: metadata.find_first_ns(namespace::DC, "source").is_some(),
        ..MetadataInfo::default()
    };

    for meta in metadata.children_named("meta") {
        let Some(property) = meta.attr("property").filter(|p| !p.is_empty()) else {
            continue;
        };
        let value = meta.text.trim().to_string();
        match property {
            ACCESS_MODE => info.access_modes.push(value),
            ACCESS_MODE_SUFFICIENT => info.access_mode_sufficient.push(value),
            ACCESSIBILITY_FEATURE => info.features.push(value),
            ACCESSIBILITY_HAZARD => info.hazards.push(value),
            ACCESSIBILITY_SUMMARY => info.summary = Some(value),
            _ => {}
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPF: &[u8] = br#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" xmlns:dc="http://purl.org/dc/elements/1.1/" unique-identifier="uid">
  <metadata>
    <dc:identifier id="uid">urn:x</dc:identifier>
    <dc:title>Book</dc:title>
    <dc:language>en</dc:language>
    <meta property="schema:accessMode"> textual </meta>
    <meta property="schema:accessibilityFeature">structuralNavigation</meta>
    <meta property="schema:accessibilitySummary">Fine.</meta>
  </metadata>
  <manifest>
    <item id="b" href="text/b.xhtml" media-type="application/xhtml+xml"/>
    <item id="a" href="text/a.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine>
    <itemref idref="b"/>
    <itemref idref="a" linear="no"/>
  </spine>
</package>"#;

    #[test]
    fn test_parse_manifest() {
        let info = ManifestInfo::parse(OPF).unwrap();
        assert_eq!(info.items.len(), 2);
        assert_eq!(info.items[0].href, "text/b.xhtml");
        assert_eq!(info.spine[0].idref, "b");
        assert!(info.spine[0].linear);
        assert!(!info.spine[1].linear);
        assert_eq!(info.spine_hrefs(), ["text/b.xhtml", "text/a.xhtml"]);
    }

    #[test]
    fn test_parse_metadata() {
        let info = ManifestInfo::parse(OPF).unwrap();
        let meta = &info.metadata;
        assert!(meta.has_title);
        assert!(meta.has_language);
        assert!(!meta.has_dc_source);
        assert_eq!(meta.access_modes, ["textual"]);
        assert!(meta.has_feature("structuralNavigation"));
        assert_eq!(meta.summary.as_deref(), Some("Fine."));
        assert!(meta.hazards.is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed_or_foreign() {
        assert!(ManifestInfo::parse(b"<package><metadata>").is_none());
        assert!(ManifestInfo::parse(b"<html/>").is_none());
    }
}
