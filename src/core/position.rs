//! Byte offset <-> line/character translation.
//!
//! Columns count bytes, not UTF-16 units, so every offset in `0..=len`
//! round-trips exactly.

/// Zero-based line and byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub const fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// Half-open span between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Zero-width range at a single position.
    pub const fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }
}

/// Convert a byte offset into a position, clamping to `[0, len]`.
pub fn offset_to_position(content: &[u8], offset: usize) -> Position {
    let offset = offset.min(content.len());
    let mut pos = Position::default();

    for &byte in &content[..offset] {
        if byte == b'\n' {
            pos.line += 1;
            pos.character = 0;
        } else {
            pos.character += 1;
        }
    }

    pos
}

/// Convert a position into a byte offset.
///
/// Returns `None` when the line does not exist or the character lies past
/// the end of its line.
pub fn position_to_offset(content: &[u8], pos: Position) -> Option<usize> {
    let mut line = 0;
    let mut character = 0;

    for offset in 0..=content.len() {
        if line == pos.line && character == pos.character {
            return Some(offset);
        }
        let Some(&byte) = content.get(offset) else {
            break;
        };
        if byte == b'\n' {
            if line == pos.line {
                return None;
            }
            line += 1;
            character = 0;
        } else {
            character += 1;
        }
    }

    None
}

/// Range covering `[start, end)` byte offsets.
pub fn offsets_to_range(content: &[u8], start: usize, end: usize) -> Range {
    Range::new(
        offset_to_position(content, start),
        offset_to_position(content, end),
    )
}
