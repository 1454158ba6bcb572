use super::{SOURCE, governed};
use crate::core::{DiagBuilder, Diagnostic, FileKind, href};
use crate::parser::{XmlNode, parse};
use crate::validator::Validator;
use crate::workspace::Snapshot;

const PRINT_PAGE_NUMBERS: &str = "printPageNumbers";

/// Page navigation consistency across the package, nav and content documents.
pub struct PageValidator;

impl Validator for PageValidator {
    fn name(&self) -> &'static str {
        "epub-accessibility-pages"
    }

    fn kinds(&self) -> &'static [FileKind] {
        &[FileKind::Manifest]
    }

    fn validate(&self, _uri: &str, content: &[u8], snapshot: Option<&Snapshot>) -> Vec<Diagnostic> {
        let Some(snapshot) = snapshot else {
            return Vec::new();
        };
        let Some(manifest) = &snapshot.manifest else {
            return Vec::new();
        };

        governed(Some(snapshot), || {
            let Ok(doc) = parse(content) else {
                return Vec::new();
            };
            let Some(metadata) = doc.find_first("package").and_then(|p| p.find_first("metadata")) else {
                return Vec::new();
            };
            let at = || DiagBuilder::new(content, metadata.offset, SOURCE);

            let navs = parsed(snapshot, &[FileKind::Navigation]);
            let page_lists: Vec<(&str, &XmlNode)> = navs
                .iter()
                .flat_map(|(uri, doc)| {
                    doc.find_all("nav")
                        .into_iter()
                        .filter(|nav| nav.epub_type() == Some("page-list"))
                        .map(move |nav| (*uri, nav))
                })
                .collect();

            let mut diags = Vec::new();

            if manifest.metadata.has_feature(PRINT_PAGE_NUMBERS) {
                if page_lists.is_empty() {
                    diags.push(
                        at().code("printPageNumbers-nopagelist")
                            .error("printPageNumbers feature declared but no page-list nav found"),
                    );
                }
                if !has_page_breaks(snapshot) {
                    diags.push(at().code("printPageNumbers-nopagebreaks").error(
                        r#"printPageNumbers feature declared but no epub:type="pagebreak" found in content"#,
                    ));
                }
            }

            if !page_lists.is_empty() && !manifest.metadata.has_dc_source {
                diags.push(
                    at().code("epub-pagesource")
                        .warning("page list present but missing dc:source metadata"),
                );
            }

            for (nav_uri, nav) in page_lists {
                for link in nav.find_all("a") {
                    let Some((file, Some(id))) = link.attr("href").map(href::split_fragment) else {
                        continue;
                    };
                    if id.is_empty() || id_exists(snapshot, nav_uri, file, id) {
                        continue;
                    }
                    diags.push(at().code("epub-pagelist-broken").error(format!(
                        "page list references nonexistent id \"{id}\" in {file}"
                    )));
                }
            }

            diags
        })
    }
}

/// Well-formed documents of the given kinds, in URI order.
fn parsed<'a>(snapshot: &'a Snapshot, kinds: &'a [FileKind]) -> Vec<(&'a str, XmlNode)> {
    snapshot
        .documents(kinds)
        .filter_map(|(uri, content)| parse(content).ok().map(|doc| (uri, doc)))
        .collect()
}

fn has_page_breaks(snapshot: &Snapshot) -> bool {
    parsed(snapshot, &[FileKind::Content, FileKind::Navigation])
        .iter()
        .any(|(_, doc)| {
            doc.descendants()
                .iter()
                .any(|node| node.epub_type().is_some_and(|t| href::contains_token(t, "pagebreak")))
        })
}

/// An element with `id` exists in a file whose URI ends with `file`
/// (the page list's own document when `file` is empty).
fn id_exists(snapshot: &Snapshot, nav_uri: &str, file: &str, id: &str) -> bool {
    snapshot
        .files
        .iter()
        .filter(|(uri, _)| if file.is_empty() { uri.as_str() == nav_uri } else { uri.ends_with(file) })
        .filter_map(|(_, content)| parse(content).ok())
        .any(|doc| doc.descendants().iter().any(|node| node.attr("id") == Some(id)))
}
