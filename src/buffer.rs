//! Text buffer traits and implementations the edit processor mutates.
//!
//! Provides `TextBuffer` (read-only) and `TextBufferMut` (bounded replace)
//! traits that abstract over different backends (String for small inputs,
//! Rope for large files). All offsets and lengths are in characters.

use ropey::Rope;
use std::ops::Range;
use thiserror::Error;

/// Errors raised by a buffer when a mutation cannot be performed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// The replaced range does not fit in the buffer
    #[error("range {start}..{end} is out of bounds for buffer length {len}")]
    OutOfRange { start: usize, end: usize, len: usize },
}

/// Read-only view into a text buffer.
pub trait TextBuffer {
    /// Total length in characters
    fn len_chars(&self) -> usize;

    /// Check if buffer is empty
    fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    /// Get slice of text as String (by character indices, clamped to the buffer)
    fn slice(&self, range: Range<usize>) -> String;

    /// Get full content as String (may be expensive for large buffers)
    fn content(&self) -> String;

    /// Convert char offset to (line, column), both zero-based
    fn offset_to_position(&self, offset: usize) -> (usize, usize);
}

/// Mutable buffer operations. Extends TextBuffer.
pub trait TextBufferMut: TextBuffer {
    /// Replace the text in `range` with `text`.
    ///
    /// Fails with [`BufferError::OutOfRange`] if `range.end` exceeds the
    /// current length or the range is inverted; the buffer is untouched then.
    fn replace(&mut self, range: Range<usize>, text: &str) -> Result<(), BufferError>;

    /// Set content, replacing everything
    fn set_content(&mut self, text: &str) -> Result<(), BufferError> {
        let len = self.len_chars();
        self.replace(0..len, text)
    }
}

fn check_range(range: &Range<usize>, len: usize) -> Result<(), BufferError> {
    if range.start > range.end || range.end > len {
        return Err(BufferError::OutOfRange {
            start: range.start,
            end: range.end,
            len,
        });
    }
    Ok(())
}

// =============================================================================
// StringBuffer - for small inputs and tests
// =============================================================================

/// TextBuffer implementation wrapping String.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringBuffer {
    text: String,
}

impl StringBuffer {
    pub fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Create a StringBuffer from a string slice
    pub fn from_text(s: &str) -> Self {
        Self {
            text: s.to_string(),
        }
    }

    /// Access the underlying string
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Convert char offset to byte offset
    fn char_to_byte(&self, char_offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_offset)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}

impl TextBuffer for StringBuffer {
    fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    fn slice(&self, range: Range<usize>) -> String {
        let start = range.start.min(self.len_chars());
        let end = range.end.min(self.len_chars());
        if start >= end {
            return String::new();
        }
        self.text.chars().skip(start).take(end - start).collect()
    }

    fn content(&self) -> String {
        self.text.clone()
    }

    fn offset_to_position(&self, offset: usize) -> (usize, usize) {
        let mut line = 0;
        let mut column = 0;
        for ch in self.text.chars().take(offset) {
            if ch == '\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }
        (line, column)
    }
}

impl TextBufferMut for StringBuffer {
    fn replace(&mut self, range: Range<usize>, text: &str) -> Result<(), BufferError> {
        check_range(&range, self.len_chars())?;
        let start_byte = self.char_to_byte(range.start);
        let end_byte = self.char_to_byte(range.end);
        self.text.replace_range(start_byte..end_byte, text);
        Ok(())
    }
}

// =============================================================================
// RopeBuffer - for multi-line document editing
// =============================================================================

/// TextBuffer implementation wrapping ropey::Rope.
/// Used for file editing with efficient operations on large inputs.
#[derive(Debug, Clone)]
pub struct RopeBuffer {
    rope: Rope,
}

impl RopeBuffer {
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Create a RopeBuffer from a string slice
    pub fn from_text(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
        }
    }
}

impl Default for RopeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer for RopeBuffer {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn slice(&self, range: Range<usize>) -> String {
        let start = range.start.min(self.len_chars());
        let end = range.end.min(self.len_chars());
        if start >= end {
            return String::new();
        }
        self.rope.slice(start..end).to_string()
    }

    fn content(&self) -> String {
        self.rope.to_string()
    }

    fn offset_to_position(&self, offset: usize) -> (usize, usize) {
        let clamped = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(clamped);
        let line_start = self.rope.line_to_char(line);
        (line, clamped - line_start)
    }
}

impl TextBufferMut for RopeBuffer {
    fn replace(&mut self, range: Range<usize>, text: &str) -> Result<(), BufferError> {
        check_range(&range, self.len_chars())?;
        if range.start < range.end {
            self.rope.remove(range.clone());
        }
        if !text.is_empty() {
            self.rope.insert(range.start, text);
        }
        Ok(())
    }
}
