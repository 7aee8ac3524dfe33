//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::Cell;
use std::ops::Range;

use textedit::{
    BufferError, EditError, EditProcessor, EditRoot, EditStyle, StringBuffer, TextBuffer,
    TextBufferMut, TextEdit, UndoEdit,
};

/// Apply `root` to `text`, returning the new text and the undo
pub fn apply(text: &str, root: TextEdit) -> (String, UndoEdit) {
    let mut buffer = StringBuffer::from_text(text);
    let undo = EditProcessor::new(&mut buffer, root, EditStyle::CREATE_UNDO)
        .perform_edits()
        .expect("edit tree should apply");
    (buffer.as_str().to_string(), undo)
}

/// Apply `root` with region tracking and hand back the processed tree
pub fn apply_with_regions(text: &str, root: TextEdit) -> (String, TextEdit) {
    let mut buffer = StringBuffer::from_text(text);
    let mut processor = EditProcessor::new(&mut buffer, root, EditStyle::UPDATE_REGIONS);
    processor.perform_edits().expect("edit tree should apply");
    let EditRoot::Tree(tree) = processor.into_root() else {
        panic!("processor was given a tree");
    };
    (buffer.as_str().to_string(), tree)
}

/// Try to apply `root` to `text`; the buffer text is returned either way
pub fn try_apply(text: &str, root: TextEdit) -> (String, Result<UndoEdit, EditError>) {
    let mut buffer = StringBuffer::from_text(text);
    let result = EditProcessor::new(&mut buffer, root, EditStyle::CREATE_UNDO).perform_edits();
    (buffer.as_str().to_string(), result)
}

/// Replay `undo` on `text`, returning the restored text and the redo
pub fn undo(text: &str, undo: UndoEdit) -> (String, UndoEdit) {
    let mut buffer = StringBuffer::from_text(text);
    let redo = EditProcessor::new(&mut buffer, undo, EditStyle::CREATE_UNDO)
        .perform_edits()
        .expect("undo should apply");
    (buffer.as_str().to_string(), redo)
}

/// Slice of `text` covered by a region, in chars
pub fn region_text(text: &str, offset: usize, length: usize) -> String {
    text.chars().skip(offset).take(length).collect()
}

/// StringBuffer that counts reads and writes
#[derive(Debug, Default)]
pub struct CountingBuffer {
    inner: StringBuffer,
    pub slices: Cell<usize>,
    pub replaces: usize,
}

impl CountingBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            inner: StringBuffer::from_text(text),
            ..Self::default()
        }
    }

    pub fn as_str(&self) -> &str {
        self.inner.as_str()
    }
}

impl TextBuffer for CountingBuffer {
    fn len_chars(&self) -> usize {
        self.inner.len_chars()
    }

    fn slice(&self, range: Range<usize>) -> String {
        self.slices.set(self.slices.get() + 1);
        self.inner.slice(range)
    }

    fn content(&self) -> String {
        self.inner.content()
    }

    fn offset_to_position(&self, offset: usize) -> (usize, usize) {
        self.inner.offset_to_position(offset)
    }
}

impl TextBufferMut for CountingBuffer {
    fn replace(&mut self, range: Range<usize>, text: &str) -> Result<(), BufferError> {
        self.replaces += 1;
        self.inner.replace(range, text)
    }
}

/// Buffer whose replaces fail once `budget` of them have gone through
#[derive(Debug)]
pub struct FailingBuffer {
    inner: StringBuffer,
    budget: usize,
}

impl FailingBuffer {
    pub fn new(text: &str, budget: usize) -> Self {
        Self {
            inner: StringBuffer::from_text(text),
            budget,
        }
    }
}

impl TextBuffer for FailingBuffer {
    fn len_chars(&self) -> usize {
        self.inner.len_chars()
    }

    fn slice(&self, range: Range<usize>) -> String {
        self.inner.slice(range)
    }

    fn content(&self) -> String {
        self.inner.content()
    }

    fn offset_to_position(&self, offset: usize) -> (usize, usize) {
        self.inner.offset_to_position(offset)
    }
}

impl TextBufferMut for FailingBuffer {
    fn replace(&mut self, range: Range<usize>, text: &str) -> Result<(), BufferError> {
        if self.budget == 0 {
            return Err(BufferError::OutOfRange {
                start: range.start,
                end: range.end,
                len: self.inner.len_chars(),
            });
        }
        self.budget -= 1;
        self.inner.replace(range, text)
    }
}
