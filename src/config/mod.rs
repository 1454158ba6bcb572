//! Server configuration management for `epub-lsp.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── accessibility  # [accessibility]
//! │   └── validation     # [validation]
//! ├── types/         # Utility types
//! │   └── error      # ConfigError
//! └── mod.rs         # ServerConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section            | Purpose                                      |
//! |--------------------|----------------------------------------------|
//! | `[accessibility]`  | Severity of accessibility findings           |
//! | `[validation]`     | Debounce window and per-file task timeout    |
//!
//! # Lookup
//!
//! `--config PATH` wins; otherwise `epub-lsp.toml` in the workspace root is
//! read during `initialize`; otherwise defaults apply. The client's
//! `initializationOptions.accessibility` overrides the file.

pub mod section;
pub mod types;

pub use section::{AccessibilityConfig, AccessibilityLevel, ValidationConfig};
pub use types::ConfigError;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::log;

/// Default config file name, looked up in the workspace root.
pub const CONFIG_FILE: &str = "epub-lsp.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub accessibility: AccessibilityConfig,
    pub validation: ValidationConfig,
}

impl ServerConfig {
    /// Resolve configuration for a session.
    ///
    /// An explicit path must exist; the workspace file is optional.
    pub fn load(explicit: Option<&Path>, root: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        match root.map(|root| root.join(CONFIG_FILE)) {
            Some(path) if path.is_file() => Self::from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from file path with unknown field detection.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let config = Self::parse(&content, path)?;
        log!("config"; "loaded {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML content; `path` only labels warnings.
    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let (config, ignored) = Self::parse_with_ignored(content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.validation.debounce_ms > section::MAX_DEBOUNCE_MS {
            return Err(ConfigError::Validation(format!(
                "validation.debounce_ms must not exceed {}",
                section::MAX_DEBOUNCE_MS
            )));
        }
        Ok(())
    }

    /// Apply `initializationOptions` sent by the client.
    ///
    /// Only `accessibility` is recognized; an empty string keeps the current
    /// level and unknown values are logged and ignored.
    pub fn apply_init_options(&mut self, options: Option<&serde_json::Value>) {
        let Some(value) = options
            .and_then(|o| o.get("accessibility"))
            .and_then(|v| v.as_str())
        else {
            return;
        };
        if value.trim().is_empty() {
            return;
        }
        match AccessibilityLevel::from_option(value) {
            Some(level) => self.accessibility.severity = level,
            None => log!("warning"; "unknown accessibility option `{}`, keeping `{}`", value, self.accessibility.severity.name()),
        }
    }
}
