//! `[accessibility]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [accessibility]
//! severity = "warning"        # error | warning | ignore
//! ```

use serde::{Deserialize, Serialize};

use crate::core::Severity;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessibilityConfig {
    /// Severity of every accessibility finding, or `ignore` to skip them.
    pub severity: AccessibilityLevel,
}

/// How accessibility findings are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessibilityLevel {
    Error,
    #[default]
    Warning,
    Ignore,
}

impl AccessibilityLevel {
    /// Parse a client-supplied option (`"error"`, `"warning"`, `"ignore"`).
    pub fn from_option(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "ignore" | "off" => Some(Self::Ignore),
            _ => None,
        }
    }

    /// Severity forced onto accessibility findings; `None` when ignored.
    pub fn severity(self) -> Option<Severity> {
        match self {
            Self::Error => Some(Severity::Error),
            Self::Warning => Some(Severity::Warning),
            Self::Ignore => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Ignore => "ignore",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_option() {
        assert_eq!(AccessibilityLevel::from_option("error"), Some(AccessibilityLevel::Error));
        assert_eq!(AccessibilityLevel::from_option(" Warning "), Some(AccessibilityLevel::Warning));
        assert_eq!(AccessibilityLevel::from_option("ignore"), Some(AccessibilityLevel::Ignore));
        assert_eq!(AccessibilityLevel::from_option(""), None);
        assert_eq!(AccessibilityLevel::from_option("loud"), None);
    }

    #[test]
    fn test_severity() {
        assert_eq!(AccessibilityLevel::Error.severity(), Some(Severity::Error));
        assert_eq!(AccessibilityLevel::Ignore.severity(), None);
    }
}
