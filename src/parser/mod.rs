//! Document parsing and source-position resolution.
//!
//! - `xml` - namespace-aware tree builder with element offsets
//! - `css` - stylesheet scanner
//! - `span` - tag and element end discovery over raw bytes
//! - `attr` - attribute span recovery inside a tag
//! - `locate` - cursor offset to element/attribute

pub mod attr;
pub mod css;
pub mod locate;
pub mod span;
pub mod xml;

pub use locate::{Located, locate};
pub use xml::{XmlAttr, XmlError, XmlNode, parse};

use crate::core::{DiagBuilder, Diagnostic};

/// Source tag of well-formedness diagnostics.
pub const XML_SOURCE: &str = "epub-xml";

/// Single diagnostic describing why a document failed to parse.
pub fn well_formedness_diagnostic(content: &[u8], err: &XmlError) -> Diagnostic {
    DiagBuilder::new(content, err.offset, XML_SOURCE)
        .error(format!("XML well-formedness error: {err}"))
}
