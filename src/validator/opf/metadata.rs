use super::SOURCE;
use crate::core::{DiagBuilder, Diagnostic, namespace};
use crate::parser::XmlNode;

/// Required Dublin Core elements and the unique identifier reference.
pub(super) fn check(content: &[u8], package: &XmlNode) -> Vec<Diagnostic> {
    let at = |node: &XmlNode| DiagBuilder::new(content, node.offset, SOURCE);

    let Some(metadata) = package.find_first("metadata") else {
        return vec![at(package).code("OPF_030").error("missing required <metadata> element")];
    };

    let mut diags = Vec::new();

    let identifiers = metadata.find_all_ns(namespace::DC, "identifier");
    if identifiers.is_empty() {
        diags.push(at(metadata).code("OPF_030").error("missing required <dc:identifier> in metadata"));
    }

    if let Some(unique_id) = package.attr("unique-identifier").filter(|id| !id.is_empty())
        && !identifiers.is_empty()
        && !identifiers.iter().any(|node| node.attr("id") == Some(unique_id))
    {
        diags.push(at(package).code("OPF_031").error(format!(
            "unique-identifier \"{unique_id}\" does not match any dc:identifier/@id"
        )));
    }

    if metadata.find_first_ns(namespace::DC, "title").is_none() {
        diags.push(at(metadata).code("OPF_032").error("missing required <dc:title> in metadata"));
    }

    if metadata.find_first_ns(namespace::DC, "language").is_none() {
        diags.push(at(metadata).code("OPF_034").error("missing required <dc:language> in metadata"));
    }

    diags
}
