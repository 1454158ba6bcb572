//! Namespace URIs used across EPUB documents.

pub const EPUB: &str = "http://www.idpf.org/2007/ops";
pub const DC: &str = "http://purl.org/dc/elements/1.1/";
pub const XHTML: &str = "http://www.w3.org/1999/xhtml";
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
pub const OPF: &str = "http://www.idpf.org/2007/opf";
