use rustc_hash::FxHashSet;

use super::SOURCE;
use crate::core::{DiagBuilder, Diagnostic};
use crate::parser::XmlNode;

/// Per-item attribute checks and duplicate ids.
pub(super) fn check(content: &[u8], package: &XmlNode) -> Vec<Diagnostic> {
    let Some(manifest) = package.find_first("manifest") else {
        return Vec::new();
    };

    let mut diags = Vec::new();
    let mut seen = FxHashSet::default();

    for item in manifest.children_named("item") {
        let at = || DiagBuilder::new(content, item.offset, SOURCE);

        if item.attr("media-type").is_none_or(str::is_empty) {
            diags.push(at().code("OPF_025").warning("manifest item missing media-type attribute"));
        }

        if item.attr("href").is_none_or(str::is_empty) {
            diags.push(at().warning("manifest item href is empty"));
        }

        if let Some(id) = item.id()
            && !seen.insert(id)
        {
            diags.push(at().warning(format!("duplicate manifest item id: \"{id}\"")));
        }
    }

    diags
}
