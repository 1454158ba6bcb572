//! Core types - pure abstractions shared across the codebase.

pub mod diagnostic;
pub mod href;
pub mod kind;
pub mod manifest;
pub mod namespace;
pub mod position;

pub use diagnostic::{DiagBuilder, Diagnostic, Severity};
pub use kind::FileKind;
pub use manifest::{ManifestInfo, ManifestItem, MetadataInfo, SpineItem};
pub use position::{Position, Range, offset_to_position, offsets_to_range, position_to_offset};
