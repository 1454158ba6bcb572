//! `check` command: one-shot validation of an EPUB source tree.
//!
//! Runs the same validator registry the server uses, over every target file
//! under PATH, and prints diagnostics as `path:line:col severity [code] message`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use jwalk::WalkDir;
use owo_colors::{OwoColorize, Stream, Style};
use rayon::prelude::*;
use url::Url;

use super::args::CheckArgs;
use crate::config::{AccessibilityLevel, ServerConfig};
use crate::core::{Diagnostic, FileKind, Severity};
use crate::log;
use crate::validator::Registry;
use crate::workspace::{Content, Snapshot, WorkspaceStore};

/// Run the `check` command.
pub fn run_check(args: &CheckArgs, config_path: Option<&Path>) -> Result<()> {
    let path = args
        .path
        .canonicalize()
        .with_context(|| format!("cannot access `{}`", args.path.display()))?;
    let root = if path.is_dir() {
        path.clone()
    } else {
        path.parent().map(Path::to_path_buf).unwrap_or_else(|| path.clone())
    };

    let config = ServerConfig::load(config_path, Some(&root))?;
    let level = args.accessibility.unwrap_or(config.accessibility.severity);

    let files = collect_files(&path)?;
    log!("check"; "{} file{} under {}", files.len(), plural_s(files.len()), root.display());

    let report = check_files(files, &root, level);
    report.print();
    eprintln!("{report}");

    if report.errors > 0 && !args.warn_only {
        bail!("found {} error{}", report.errors, plural_s(report.errors));
    }
    Ok(())
}

// ============================================================================
// Collection
// ============================================================================

/// Load every target file under `path`, keyed by `file://` URI.
fn collect_files(path: &Path) -> Result<BTreeMap<String, (PathBuf, Content)>> {
    let paths: Vec<PathBuf> = if path.is_dir() {
        WalkDir::new(path)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path())
            .collect()
    } else {
        vec![path.to_path_buf()]
    };

    let mut files = BTreeMap::new();
    for path in paths {
        let Ok(url) = Url::from_file_path(&path) else {
            continue;
        };
        let uri = url.to_string();
        if !FileKind::is_target(&uri) {
            continue;
        }
        let bytes = std::fs::read(&path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        files.insert(uri, (path, Content::from(bytes)));
    }
    Ok(files)
}

/// Validate all files against one snapshot, in parallel.
fn check_files(
    files: BTreeMap<String, (PathBuf, Content)>,
    root: &Path,
    level: AccessibilityLevel,
) -> CheckReport {
    let store = WorkspaceStore::new();
    for (uri, (_, content)) in &files {
        store.update(uri, Arc::clone(content));
    }
    let snapshot = Snapshot::capture(&store, Some(root.to_path_buf()), level);
    let registry = Registry::with_defaults();

    let results: Vec<(String, Vec<Diagnostic>)> = files
        .par_iter()
        .map(|(uri, (path, content))| {
            let kind = snapshot.kind(uri);
            let diags = registry.validate_file(uri, content, kind, Some(&snapshot));
            let shown = path.strip_prefix(root).unwrap_or(path);
            (shown.display().to_string(), diags)
        })
        .collect();

    let mut report = CheckReport {
        files: files.len(),
        ..Default::default()
    };
    for (path, diags) in results {
        report.add(path, diags);
    }
    report
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Default)]
struct CheckReport {
    /// Files checked.
    files: usize,
    errors: usize,
    warnings: usize,
    /// Diagnostics per displayed path, only for files with findings.
    findings: BTreeMap<String, Vec<Diagnostic>>,
}

impl CheckReport {
    fn add(&mut self, path: String, mut diags: Vec<Diagnostic>) {
        if diags.is_empty() {
            return;
        }
        diags.sort_by_key(|d| (d.range.start.line, d.range.start.character));
        for d in &diags {
            match d.severity {
                Severity::Error => self.errors += 1,
                Severity::Warning => self.warnings += 1,
                _ => {}
            }
        }
        self.findings.insert(path, diags);
    }

    fn print(&self) {
        for (path, diags) in &self.findings {
            for d in diags {
                eprintln!("{}", format_line(path, d));
            }
        }
    }
}

fn format_line(path: &str, d: &Diagnostic) -> String {
    let location = format!(
        "{}:{}:{}",
        path,
        d.range.start.line + 1,
        d.range.start.character + 1
    );
    let severity = match d.severity {
        Severity::Error => Style::new().red().bold(),
        Severity::Warning => Style::new().yellow().bold(),
        _ => Style::new().blue(),
    };
    let code = d.code.map(|c| format!(" [{c}]")).unwrap_or_default();
    format!(
        "{} {}{} {} {}",
        paint(location, Style::new().cyan()),
        paint(d.severity.name(), severity),
        paint(code, Style::new().dimmed()),
        d.message,
        paint(format!("({})", d.source), Style::new().dimmed())
    )
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dimmed = Style::new().dimmed();
        let checked = paint(
            format!("checked {} file{}", self.files, plural_s(self.files)),
            dimmed,
        );
        if self.errors == 0 && self.warnings == 0 {
            return write!(f, "{checked}, {}", paint("all checks passed", Style::new().green()));
        }
        write!(
            f,
            "{checked}, {} {}, {} {}",
            paint(self.errors, Style::new().red().bold()),
            paint(format!("error{}", plural_s(self.errors)), dimmed),
            paint(self.warnings, Style::new().yellow().bold()),
            paint(format!("warning{}", plural_s(self.warnings)), dimmed)
        )
    }
}

/// Style `text` when stderr supports color, honoring `--color`.
fn paint(text: impl fmt::Display, style: Style) -> String {
    text.if_supports_color(Stream::Stderr, |t| t.style(style))
        .to_string()
}

#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Position, Range};
    use std::fs;
    use tempfile::TempDir;

    const OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="uid">urn:uuid:1</dc:identifier>
    <dc:title>Book</dc:title>
    <dc:language>en</dc:language>
  </metadata>
  <manifest>
    <item id="ch1" href="ch1.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine>
    <itemref idref="ch1"/>
  </spine>
</package>"#;

    fn args(path: &Path, warn_only: bool) -> CheckArgs {
        CheckArgs {
            path: path.to_path_buf(),
            accessibility: Some(AccessibilityLevel::Ignore),
            warn_only,
        }
    }

    #[test]
    fn test_collect_skips_non_targets() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("OEBPS")).unwrap();
        fs::write(temp.path().join("OEBPS/content.opf"), OPF).unwrap();
        fs::write(temp.path().join("OEBPS/style.css"), "p {}").unwrap();
        fs::write(temp.path().join("cover.png"), [0u8; 4]).unwrap();

        let files = collect_files(temp.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.keys().all(|uri| uri.starts_with("file://")));
    }

    #[test]
    fn test_broken_package_fails() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("content.opf"), "<package><metadata>").unwrap();

        let err = run_check(&args(temp.path(), false), None).unwrap_err();
        assert!(err.to_string().starts_with("found "));
        assert!(run_check(&args(temp.path(), true), None).is_ok());
    }

    #[test]
    fn test_css_finding_reported_with_relative_path() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("style.css"), "p { direction: rtl; }").unwrap();
        let root = temp.path().canonicalize().unwrap();

        let files = collect_files(&root).unwrap();
        let report = check_files(files, &root, AccessibilityLevel::Ignore);
        let diags = &report.findings["style.css"];
        assert!(diags.iter().any(|d| d.has_code("CSS_001")));
        assert_eq!(report.errors, diags.len());
    }

    #[test]
    fn test_format_line_is_one_based() {
        owo_colors::set_override(false);
        let d = Diagnostic {
            code: Some("OPF_030"),
            severity: Severity::Error,
            message: "missing required <metadata> element".into(),
            range: Range::point(Position::new(1, 0)),
            source: "epub-opf",
        };
        assert_eq!(
            format_line("content.opf", &d),
            "content.opf:2:1 error [OPF_030] missing required <metadata> element (epub-opf)"
        );
    }

    #[test]
    fn test_summary_plain_without_color() {
        owo_colors::set_override(false);
        let mut report = CheckReport {
            files: 2,
            ..Default::default()
        };
        assert_eq!(report.to_string(), "checked 2 files, all checks passed");

        report.errors = 1;
        report.warnings = 3;
        assert_eq!(report.to_string(), "checked 2 files, 1 error, 3 warnings");
    }

    #[test]
    fn test_missing_path_is_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(run_check(&args(&missing, false), None).is_err());
    }
}
