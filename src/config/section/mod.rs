//! Configuration section definitions.

mod accessibility;
mod validation;

pub use accessibility::{AccessibilityConfig, AccessibilityLevel};
pub use validation::{MAX_DEBOUNCE_MS, ValidationConfig};
