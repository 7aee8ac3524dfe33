//! Edit processor - applies an edit tree to a buffer as one operation.
//!
//! The processor runs a fixed protocol:
//!
//! 1. Integrity check (once; the outcome is memoized)
//! 2. Source computation for copy and move edits
//! 3. Document update, wrapped by the undo collector when requested
//! 4. Region update, when requested
//!
//! A structural fault is always reported before the buffer is touched. An
//! apply fault leaves the buffer in an undefined state; nothing is rolled
//! back.
//!
//! # Example
//!
//! ```ignore
//! use textedit::{EditProcessor, EditStyle, StringBuffer, TextEdit};
//!
//! let mut buffer = StringBuffer::from_text("Hello World");
//! let root = TextEdit::multi().with_child(TextEdit::replace(0, 5, "Hi"));
//! let undo = EditProcessor::new(&mut buffer, root, EditStyle::CREATE_UNDO).perform_edits()?;
//! assert_eq!(buffer.as_str(), "Hi World");
//!
//! EditProcessor::new(&mut buffer, undo, EditStyle::NONE).perform_edits()?;
//! assert_eq!(buffer.as_str(), "Hello World");
//! ```

mod integrity;
mod regions;
mod sources;
mod updater;

use bitflags::bitflags;

use crate::buffer::TextBufferMut;
use crate::edit::{EditRange, TextEdit};
use crate::error::{EditError, StructuralFault};
use crate::undo::{UndoCollector, UndoEdit};

use sources::SourceEdit;

bitflags! {
    /// How a processor performs its edits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EditStyle: u32 {
        /// Capture an undo edit while applying
        const CREATE_UNDO = 1;
        /// Compute the post-edit region of every edit
        const UPDATE_REGIONS = 2;
    }
}

impl EditStyle {
    pub const NONE: Self = Self::empty();
}

/// What a processor applies: a fresh edit tree or a captured undo
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditRoot {
    Tree(TextEdit),
    Undo(UndoEdit),
}

impl EditRoot {
    pub fn range(&self) -> EditRange {
        match self {
            EditRoot::Tree(edit) => edit.range(),
            EditRoot::Undo(undo) => undo.range,
        }
    }

    /// The edit tree, if this root is one
    pub fn as_tree(&self) -> Option<&TextEdit> {
        match self {
            EditRoot::Tree(edit) => Some(edit),
            EditRoot::Undo(_) => None,
        }
    }
}

impl From<TextEdit> for EditRoot {
    fn from(edit: TextEdit) -> Self {
        EditRoot::Tree(edit)
    }
}

impl From<UndoEdit> for EditRoot {
    fn from(undo: UndoEdit) -> Self {
        EditRoot::Undo(undo)
    }
}

/// Applies one edit tree to one buffer.
///
/// The processor holds the only mutable borrow of the buffer for its whole
/// lifetime and owns the tree it was given. It is single use: after
/// `perform_edits` has run, further calls return
/// [`EditError::AlreadyPerformed`].
pub struct EditProcessor<'a, B: TextBufferMut> {
    buffer: &'a mut B,
    root: EditRoot,
    style: EditStyle,
    checked: Option<Result<(), StructuralFault>>,
    sources: Vec<SourceEdit>,
    integrity_passes: usize,
    performed: bool,
}

impl<'a, B: TextBufferMut> EditProcessor<'a, B> {
    /// Take ownership of `root` for editing `buffer`.
    ///
    /// Multi edits created without a range get their region defined here,
    /// as the union of their children.
    pub fn new(buffer: &'a mut B, root: impl Into<EditRoot>, style: EditStyle) -> Self {
        let mut root = root.into();
        if let EditRoot::Tree(edit) = &mut root {
            edit.define_regions(0);
        }
        Self {
            buffer,
            root,
            style,
            checked: None,
            sources: Vec::new(),
            integrity_passes: 0,
            performed: false,
        }
    }

    pub fn buffer(&self) -> &B {
        &*self.buffer
    }

    pub fn root(&self) -> &EditRoot {
        &self.root
    }

    /// Give back the root, with regions filled in if they were requested
    pub fn into_root(self) -> EditRoot {
        self.root
    }

    pub fn style(&self) -> EditStyle {
        self.style
    }

    /// Number of integrity checks this processor actually ran (0 or 1)
    pub fn integrity_passes(&self) -> usize {
        self.integrity_passes
    }

    /// Whether the edits can be performed. Never modifies the buffer.
    pub fn can_perform_edits(&mut self) -> bool {
        self.check_integrity().is_ok()
    }

    /// Like [`can_perform_edits`](Self::can_perform_edits), but reports the fault
    pub fn check(&mut self) -> Result<(), StructuralFault> {
        self.check_integrity()
    }

    /// Apply the edits.
    ///
    /// Returns the undo edit, empty unless [`EditStyle::CREATE_UNDO`] is set.
    pub fn perform_edits(&mut self) -> Result<UndoEdit, EditError> {
        if self.performed {
            return Err(EditError::AlreadyPerformed);
        }
        self.check_integrity()?;
        self.performed = true;

        let create_undo = self.style.contains(EditStyle::CREATE_UNDO);
        let update_regions = self.style.contains(EditStyle::UPDATE_REGIONS);
        tracing::debug!(
            create_undo,
            update_regions,
            range = %self.root.range(),
            "performing edits"
        );

        let undo = match &mut self.root {
            EditRoot::Tree(edit) => {
                sources::compute_sources(edit, &self.sources, &*self.buffer);
                let hosted = sources::hosted_deletions(&self.sources);

                let mut collector = UndoCollector::new(&mut *self.buffer);
                if create_undo {
                    collector.connect();
                }
                let applied = updater::apply_tree(edit, &hosted, &mut collector);
                let range = resized(edit.range(), applied.as_ref().copied().unwrap_or(0));
                let undo = collector.disconnect(range);
                applied?;

                if update_regions {
                    regions::update_regions(edit, &hosted);
                }
                undo
            }
            EditRoot::Undo(steps) => {
                let mut collector = UndoCollector::new(&mut *self.buffer);
                if create_undo {
                    collector.connect();
                }
                let applied = updater::apply_undo(steps, &mut collector);
                let range = resized(steps.range, applied.as_ref().copied().unwrap_or(0));
                let redo = collector.disconnect(range);
                applied?;
                redo
            }
        };

        tracing::debug!(undo_steps = undo.len(), "edits performed");
        Ok(undo)
    }

    fn check_integrity(&mut self) -> Result<(), StructuralFault> {
        if let Some(outcome) = &self.checked {
            return outcome.clone();
        }
        self.integrity_passes += 1;
        let document_len = self.buffer.len_chars();
        let outcome = match &self.root {
            EditRoot::Tree(edit) => integrity::check_tree(edit, document_len).map(|sources| {
                tracing::trace!(sources = sources.len(), "edit tree is well formed");
                self.sources = sources;
            }),
            EditRoot::Undo(undo) => integrity::check_undo(undo, document_len),
        };
        if let Err(fault) = &outcome {
            tracing::warn!(%fault, "edit tree rejected");
        }
        self.checked = Some(outcome.clone());
        outcome
    }
}

fn resized(range: EditRange, delta: isize) -> EditRange {
    EditRange::new(
        range.offset,
        range.length.checked_add_signed(delta).unwrap_or(0),
    )
}
