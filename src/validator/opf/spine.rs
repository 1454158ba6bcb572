use rustc_hash::FxHashSet;

use super::SOURCE;
use crate::core::{DiagBuilder, Diagnostic};
use crate::parser::XmlNode;

/// Spine presence and idref resolution against manifest ids.
pub(super) fn check(content: &[u8], package: &XmlNode) -> Vec<Diagnostic> {
    let Some(spine) = package.find_first("spine") else {
        return vec![
            DiagBuilder::new(content, package.offset, SOURCE)
                .code("OPF_019")
                .error("missing required <spine> element"),
        ];
    };

    let manifest_ids: FxHashSet<&str> = package
        .find_first("manifest")
        .map(|manifest| manifest.children_named("item").filter_map(XmlNode::id).collect())
        .unwrap_or_default();

    spine
        .children_named("itemref")
        .filter_map(|itemref| {
            let idref = itemref.attr("idref").filter(|id| !id.is_empty())?;
            (!manifest_ids.contains(idref)).then(|| {
                DiagBuilder::new(content, itemref.offset, SOURCE)
                    .code("OPF_003")
                    .error(format!("spine itemref references nonexistent manifest id: \"{idref}\""))
            })
        })
        .collect()
}
