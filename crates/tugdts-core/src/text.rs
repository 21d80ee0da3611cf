//! Text position utilities for byte offset and line:column conversions.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**
//! - Columns count Unicode scalar values, not bytes

// ============================================================================
// Char-based Conversions (for &str)
// ============================================================================

/// Convert a byte offset to 1-indexed line and column (Unicode-aware).
///
/// If `offset` exceeds the content length, returns the position at the end
/// of the content.
pub fn byte_offset_to_position_str(content: &str, offset: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut col = 1u32;
    let mut current_offset = 0usize;

    for ch in content.chars() {
        if current_offset >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
        current_offset += ch.len_utf8();
    }

    (line, col)
}

// ============================================================================
// Line Utilities
// ============================================================================

/// Byte bounds `[start, end)` of the line containing `offset`.
///
/// `end` excludes the terminating newline. Offsets past the end of the
/// content resolve to the last line.
pub fn line_bounds(content: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(content.len());
    while !content.is_char_boundary(offset) {
        offset -= 1;
    }
    let start = content[..offset].rfind('\n').map(|p| p + 1).unwrap_or(0);
    let end = content[offset..]
        .find('\n')
        .map(|p| offset + p)
        .unwrap_or(content.len());
    (start, end)
}

// ============================================================================
// Tests
// ============================================================================
