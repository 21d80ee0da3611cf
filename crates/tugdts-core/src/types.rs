//! Common types shared between the tree model, error and output modules.
//!
//! Kept separate so that `error` and `output` can both use them without
//! depending on each other.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::text::byte_offset_to_position_str;

// ============================================================================
// Span Type
// ============================================================================

/// Byte offsets into declaration source text.
///
/// Spans are half-open intervals: `[start, end)`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    ///
    /// A reversed range is normalized so that `start <= end` always holds.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Span { start, end }
        } else {
            Span {
                start: end,
                end: start,
            }
        }
    }

    /// An empty span at `offset`.
    pub fn empty(offset: usize) -> Self {
        Span {
            start: offset,
            end: offset,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The text this span covers, or `None` if it falls outside `text`
    /// or splits a UTF-8 character.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ============================================================================
// Location Type
// ============================================================================

/// Location in a declaration source file.
///
/// - `file`: File name as given to the parser
/// - `line`: 1-indexed line number
/// - `col`: 1-indexed column, counted in chars
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    /// File name.
    pub file: String,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub col: u32,
}

impl Location {
    /// Create a new location.
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        Location {
            file: file.into(),
            line,
            col,
        }
    }

    /// Resolve a byte offset in `text` to a location.
    pub fn from_offset(file: impl Into<String>, text: &str, offset: usize) -> Self {
        let (line, col) = byte_offset_to_position_str(text, offset);
        Location::new(file, line, col)
    }

    /// Comparison key for deterministic sorting: (file, line, col).
    fn sort_key(&self) -> (&str, u32, u32) {
        (&self.file, self.line, self.col)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_new_normalizes_reversed_range() {
        let span = Span::new(10, 4);
        assert_eq!(span, Span { start: 4, end: 10 });
        assert_eq!(span.len(), 6);
    }

    #[test]
    fn span_slice_out_of_bounds_is_none() {
        let text = "class A {}";
        assert_eq!(Span::new(0, 5).slice(text), Some("class"));
        assert_eq!(Span::new(5, 50).slice(text), None);
    }

    #[test]
    fn location_from_offset() {
        let text = "a\nbc\ndef";
        let loc = Location::from_offset("x.d.ts", text, 6);
        assert_eq!(loc, Location::new("x.d.ts", 3, 2));
        assert_eq!(loc.to_string(), "x.d.ts:3:2");
    }

    #[test]
    fn location_sorts_by_file_line_col() {
        let mut locs = vec![
            Location::new("b.d.ts", 1, 1),
            Location::new("a.d.ts", 2, 1),
            Location::new("a.d.ts", 1, 5),
        ];
        locs.sort();
        assert_eq!(locs[0], Location::new("a.d.ts", 1, 5));
        assert_eq!(locs[2], Location::new("b.d.ts", 1, 1));
    }
}
