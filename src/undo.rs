//! Undo capture for the edit processor.
//!
//! `UndoCollector` sits between the processor and the buffer for the whole
//! mutation pass. While connected it records, for every replace, the text
//! that was overwritten and the length that was written, which is exactly
//! the inverse of that replace. Replaying the recorded steps last to first
//! restores the buffer.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::buffer::{BufferError, TextBuffer, TextBufferMut};
use crate::edit::EditRange;

/// Inverse of one buffer replace: put `text` back over `[offset, offset + length)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoStep {
    pub offset: usize,
    /// Length of the text the forward replace wrote
    pub length: usize,
    /// Text the forward replace overwrote
    pub text: String,
}

impl UndoStep {
    pub fn range(&self) -> EditRange {
        EditRange::new(self.offset, self.length)
    }
}

/// The inverse of a performed edit tree.
///
/// Steps are stored in the order the forward replaces happened and are
/// applied in reverse. `range` covers everything the forward edit touched,
/// in post-edit coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UndoEdit {
    pub range: EditRange,
    pub steps: Vec<UndoStep>,
}

impl UndoEdit {
    /// Undo that changes nothing
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

/// Buffer wrapper recording the inverse of every replace while connected
pub struct UndoCollector<'b, B: TextBufferMut> {
    buffer: &'b mut B,
    connected: bool,
    steps: Vec<UndoStep>,
}

impl<'b, B: TextBufferMut> UndoCollector<'b, B> {
    pub fn new(buffer: &'b mut B) -> Self {
        Self {
            buffer,
            connected: false,
            steps: Vec::new(),
        }
    }

    /// Start recording replaces
    pub fn connect(&mut self) {
        self.connected = true;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Stop recording and hand out what was captured.
    /// `range` is the covering range of the performed edit after mutation.
    pub fn disconnect(self, range: EditRange) -> UndoEdit {
        if !self.connected {
            return UndoEdit::empty();
        }
        tracing::trace!(steps = self.steps.len(), "undo collector disconnected");
        UndoEdit {
            range,
            steps: self.steps,
        }
    }
}

impl<B: TextBufferMut> TextBuffer for UndoCollector<'_, B> {
    fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    fn slice(&self, range: Range<usize>) -> String {
        self.buffer.slice(range)
    }

    fn content(&self) -> String {
        self.buffer.content()
    }

    fn offset_to_position(&self, offset: usize) -> (usize, usize) {
        self.buffer.offset_to_position(offset)
    }
}

impl<B: TextBufferMut> TextBufferMut for UndoCollector<'_, B> {
    fn replace(&mut self, range: Range<usize>, text: &str) -> Result<(), BufferError> {
        if !self.connected {
            return self.buffer.replace(range, text);
        }
        if range.is_empty() && text.is_empty() {
            return Ok(());
        }
        let previous = if range.is_empty() {
            String::new()
        } else {
            self.buffer.slice(range.clone())
        };
        self.buffer.replace(range.clone(), text)?;
        self.steps.push(UndoStep {
            offset: range.start,
            length: text.chars().count(),
            text: previous,
        });
        Ok(())
    }
}
