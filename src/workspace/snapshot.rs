//! Immutable per-batch view of the workspace.

use std::collections::BTreeMap;
use std::path::PathBuf;

use rustc_hash::FxHashMap;

use super::store::{Content, WorkspaceStore};
use crate::config::AccessibilityLevel;
use crate::core::{FileKind, ManifestInfo, href};

/// Everything cross-file rules may read during one validation batch.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Workspace root from `initialize`, if any. Carried for root-relative
    /// rules; no registered validator reads it yet.
    pub root: Option<PathBuf>,
    pub files: BTreeMap<String, Content>,
    pub kinds: FxHashMap<String, FileKind>,
    /// Parsed package document, when one is present and well-formed.
    pub manifest: Option<ManifestInfo>,
    pub manifest_uri: Option<String>,
    pub accessibility: AccessibilityLevel,
}

impl Snapshot {
    /// Build from the store's current state.
    pub fn capture(
        store: &WorkspaceStore,
        root: Option<PathBuf>,
        accessibility: AccessibilityLevel,
    ) -> Self {
        Self::build(store.files(), store.kinds(), root, accessibility)
    }

    /// Build from loose files, detecting each kind.
    #[cfg(test)]
    pub fn from_files(
        files: impl IntoIterator<Item = (String, Content)>,
        root: Option<PathBuf>,
        accessibility: AccessibilityLevel,
    ) -> Self {
        let files: BTreeMap<String, Content> = files.into_iter().collect();
        let kinds = files
            .iter()
            .map(|(uri, content)| (uri.clone(), FileKind::detect(uri, content)))
            .collect();
        Self::build(files, kinds, root, accessibility)
    }

    fn build(
        files: BTreeMap<String, Content>,
        kinds: FxHashMap<String, FileKind>,
        root: Option<PathBuf>,
        accessibility: AccessibilityLevel,
    ) -> Self {
        let (manifest_uri, manifest) = select_manifest(&files, &kinds).unzip();
        Self {
            root,
            files,
            kinds,
            manifest,
            manifest_uri,
            accessibility,
        }
    }

    pub fn kind(&self, uri: &str) -> FileKind {
        self.kinds.get(uri).copied().unwrap_or(FileKind::Unknown)
    }

    /// Documents of the given kinds, in URI order.
    pub fn documents<'a>(
        &'a self,
        kinds: &'a [FileKind],
    ) -> impl Iterator<Item = (&'a str, &'a [u8])> + 'a {
        self.files
            .iter()
            .filter(move |(uri, _)| kinds.contains(&self.kind(uri)))
            .map(|(uri, content)| (uri.as_str(), &content[..]))
    }

    /// Whether a workspace file exists at a resolved path (exact or suffix).
    pub fn has_file_matching(&self, resolved: &str) -> bool {
        self.files.keys().any(|uri| href::uri_matches_path(uri, resolved))
    }
}

/// Pick the package document: the smallest manifest URI that parses.
pub fn select_manifest(
    files: &BTreeMap<String, Content>,
    kinds: &FxHashMap<String, FileKind>,
) -> Option<(String, ManifestInfo)> {
    files
        .iter()
        .filter(|(uri, _)| kinds.get(uri.as_str()) == Some(&FileKind::Manifest))
        .find_map(|(uri, content)| ManifestInfo::parse(content).map(|info| (uri.clone(), info)))
}
