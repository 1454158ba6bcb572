//! Href and URI path helpers shared by validators and navigation.

use percent_encoding::percent_decode_str;

/// `http://` or `https://` reference.
#[inline]
pub fn is_remote_url(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://")
}

/// Drop everything from the first `#`.
#[inline]
pub fn strip_fragment(href: &str) -> &str {
    href.split_once('#').map_or(href, |(path, _)| path)
}

/// Split `path#fragment`; the fragment is `None` when no `#` exists.
pub fn split_fragment(href: &str) -> (&str, Option<&str>) {
    match href.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (href, None),
    }
}

/// Whitespace-separated token list membership (`epub:type`, `role`).
pub fn contains_token(list: &str, token: &str) -> bool {
    list.split_ascii_whitespace().any(|t| t == token)
}

/// Percent-decode, keeping the input when the result isn't UTF-8.
pub fn decode(s: &str) -> String {
    percent_decode_str(s)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

/// Decoded path component of a URI, or the URI itself if it doesn't parse.
pub fn uri_path(uri: &str) -> String {
    match url::Url::parse(uri) {
        Ok(parsed) => decode(parsed.path()),
        Err(_) => uri.to_string(),
    }
}

/// Directory of a document URI's path.
pub fn dir_of_uri(uri: &str) -> String {
    if let Ok(parsed) = url::Url::parse(uri) {
        return parent_dir(&decode(parsed.path()));
    }
    match uri.rfind('/') {
        Some(idx) => uri[..idx].to_string(),
        None => String::new(),
    }
}

fn parent_dir(path: &str) -> String {
    match path.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => clean_path(&path[..idx]),
        None => ".".to_string(),
    }
}

/// Resolve a manifest or content href against a base directory.
pub fn resolve_href(base_dir: &str, href: &str) -> String {
    let decoded = decode(href);
    if decoded.starts_with('/') {
        return clean_path(&decoded);
    }
    clean_path(&format!("{base_dir}/{decoded}"))
}

/// Lexical path cleaning: collapses `//`, `.` and `..`.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            _ => parts.push(segment),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// `full == suffix`, or `full` ends with `/suffix`.
pub fn path_ends_with(full: &str, suffix: &str) -> bool {
    if suffix.is_empty() {
        return false;
    }
    full == suffix
        || (full.len() > suffix.len()
            && full.ends_with(suffix)
            && full.as_bytes()[full.len() - suffix.len() - 1] == b'/')
}

/// A workspace URI refers to `resolved` by path or suffix.
pub fn uri_matches_path(uri: &str, resolved: &str) -> bool {
    let path = uri_path(uri);
    path == resolved || path.ends_with(resolved) || uri.ends_with(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote_url() {
        assert!(is_remote_url("http://example.com"));
        assert!(is_remote_url("https://example.com/a"));
        assert!(!is_remote_url("chapter.xhtml"));
        assert!(!is_remote_url("ftp://example.com"));
    }

    #[test]
    fn test_fragments() {
        assert_eq!(strip_fragment("ch1.xhtml#p1"), "ch1.xhtml");
        assert_eq!(strip_fragment("ch1.xhtml"), "ch1.xhtml");
        assert_eq!(split_fragment("#top"), ("", Some("top")));
        assert_eq!(split_fragment("a.xhtml"), ("a.xhtml", None));
    }

    #[test]
    fn test_contains_token() {
        assert!(contains_token("bodymatter chapter", "chapter"));
        assert!(!contains_token("bodymatter chapters", "chapter"));
        assert!(!contains_token("", "chapter"));
    }

    #[test]
    fn test_dir_of_uri() {
        assert_eq!(dir_of_uri("file:///book/OEBPS/content.opf"), "/book/OEBPS");
        assert_eq!(dir_of_uri("file:///content.opf"), "/");
        assert_eq!(dir_of_uri("file:///my%20book/a.opf"), "/my book");
        assert_eq!(dir_of_uri("book/OEBPS/content.opf"), "book/OEBPS");
    }

    #[test]
    fn test_resolve_href() {
        assert_eq!(resolve_href("/book/OEBPS", "text/ch1.xhtml"), "/book/OEBPS/text/ch1.xhtml");
        assert_eq!(resolve_href("/book/OEBPS/text", "../images/a.png"), "/book/OEBPS/images/a.png");
        assert_eq!(resolve_href("/book", "my%20file.xhtml"), "/book/my file.xhtml");
        assert_eq!(resolve_href("/book", "/abs/x.css"), "/abs/x.css");
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path("/a//b/./c/../d"), "/a/b/d");
        assert_eq!(clean_path("a/../.."), "..");
        assert_eq!(clean_path("/.."), "/");
        assert_eq!(clean_path(""), ".");
    }

    #[test]
    fn test_path_ends_with() {
        assert!(path_ends_with("/book/text/ch1.xhtml", "text/ch1.xhtml"));
        assert!(path_ends_with("text/ch1.xhtml", "text/ch1.xhtml"));
        assert!(!path_ends_with("/book/xtext/ch1.xhtml", "text/ch1.xhtml"));
        assert!(!path_ends_with("/book/ch1.xhtml", ""));
    }
}
