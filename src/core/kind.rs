//! File kind detection.

use std::path::Path;

/// Kind of workspace file, determines which validators run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileKind {
    /// Package document (.opf)
    Manifest,
    /// XHTML content document
    Content,
    /// XHTML navigation document (carries `epub:type="toc"`)
    Navigation,
    /// CSS stylesheet
    Stylesheet,
    /// EPUB 2 NCX table of contents
    LegacyNavigation,
    /// Anything else
    Unknown,
}

/// Extensions the engine validates.
pub const TARGET_EXTENSIONS: &[&str] = &["opf", "xhtml", "html", "css", "ncx"];

impl FileKind {
    /// Detect kind from a document URI and its content.
    ///
    /// `.xhtml`/`.html` is ambiguous: a toc marker in the content makes it a
    /// navigation document.
    pub fn detect(uri: &str, content: &[u8]) -> Self {
        match extension(uri).as_deref() {
            Some("opf") => Self::Manifest,
            Some("ncx") => Self::LegacyNavigation,
            Some("css") => Self::Stylesheet,
            Some("xhtml" | "html") => {
                if has_toc_marker(content) {
                    Self::Navigation
                } else {
                    Self::Content
                }
            }
            _ => Self::Unknown,
        }
    }

    /// Whether a URI has an extension the engine validates.
    pub fn is_target(uri: &str) -> bool {
        extension(uri).is_some_and(|ext| TARGET_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Display name for this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Manifest => "manifest",
            Self::Content => "content",
            Self::Navigation => "navigation",
            Self::Stylesheet => "stylesheet",
            Self::LegacyNavigation => "legacy-navigation",
            Self::Unknown => "unknown",
        }
    }

    /// XHTML content or navigation document.
    #[inline]
    pub fn is_xhtml(self) -> bool {
        matches!(self, Self::Content | Self::Navigation)
    }
}

fn extension(uri: &str) -> Option<String> {
    let path = uri.split(['?', '#']).next().unwrap_or(uri);
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

fn has_toc_marker(content: &[u8]) -> bool {
    const MARKERS: [&[u8]; 2] = [b"epub:type=\"toc\"", b"epub:type='toc'"];
    MARKERS
        .iter()
        .any(|marker| content.windows(marker.len()).any(|w| w == *marker))
}
