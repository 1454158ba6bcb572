//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted output with colored prefixes
//! - `debug!` for output gated on `--verbose`
//! - an optional plain-text mirror file (`--log-file`)
//!
//! Everything goes to stderr: stdout carries the protocol stream.
//!
//! # Example
//!
//! ```ignore
//! log!("dispatch"; "validating {} files", count);
//! debug!("publish"; "{} -> {} diagnostics", uri, n);
//! ```

use std::fs::{File, OpenOptions};
use std::io::{Write, stderr};
use std::path::Path;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::{OwoColorize, Stream, Style};
use parking_lot::Mutex;

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Optional mirror of every log line, uncolored.
static LOG_FILE: OnceLock<Mutex<File>> = OnceLock::new();

/// Log files beyond this size are truncated on open.
const MAX_LOG_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Mirror log output into `path`.
pub fn set_log_file(path: &Path) -> std::io::Result<()> {
    let file = open_log_file(path)?;
    // First registration wins.
    let _ = LOG_FILE.set(Mutex::new(file));
    Ok(())
}

/// Open for appending, truncating first when past [`MAX_LOG_FILE_BYTES`].
fn open_log_file(path: &Path) -> std::io::Result<File> {
    let oversized = path
        .metadata()
        .is_ok_and(|meta| meta.len() > MAX_LOG_FILE_BYTES);

    OpenOptions::new()
        .create(true)
        .append(!oversized)
        .write(true)
        .truncate(oversized)
        .open(path)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let prefix = format!("[{module}]");
    let style = prefix_style(&module.to_ascii_lowercase());

    {
        let mut stderr = stderr().lock();
        writeln!(
            stderr,
            "{} {message}",
            prefix.if_supports_color(Stream::Stderr, |p| p.style(style))
        )
        .ok();
        stderr.flush().ok();
    }

    if let Some(file) = LOG_FILE.get() {
        let mut file = file.lock();
        writeln!(file, "{prefix} {message}").ok();
    }
}

/// Color of a module prefix based on module type
#[inline]
fn prefix_style(module_lower: &str) -> Style {
    match module_lower {
        "server" => Style::new().bright_blue().bold(),
        "publish" | "check" => Style::new().bright_green().bold(),
        "error" => Style::new().bright_red().bold(),
        _ => Style::new().bright_yellow().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_verbose_toggle() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }

    #[test]
    fn test_log_file_mirror() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("epub-lsp.log");

        // The only registration in this test binary.
        set_log_file(&path).unwrap();
        log("check", "mirrored line");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[check] mirrored line"));
    }

    #[test]
    fn test_log_file_appends_until_oversized() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("old.log");

        std::fs::write(&path, "kept\n").unwrap();
        let mut file = open_log_file(&path).unwrap();
        writeln!(file, "more").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "kept\nmore\n");

        File::create(&path)
            .unwrap()
            .set_len(MAX_LOG_FILE_BYTES + 1)
            .unwrap();
        open_log_file(&path).unwrap();
        assert_eq!(path.metadata().unwrap().len(), 0);
    }
}
