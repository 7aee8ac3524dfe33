//! Document updater - applies a checked edit tree to the buffer.
//!
//! Each edit first applies its children and any move sources it hosts,
//! rightmost first, then its own transform. Working right to left means a
//! length change only ever shifts text that has already been processed, so
//! the stored offsets of everything still pending stay valid.

use std::collections::HashMap;

use crate::buffer::{BufferError, TextBufferMut};
use crate::edit::{EditKind, EditPath, EditRange, TextEdit};
use crate::error::ApplyFault;
use crate::undo::UndoEdit;

/// Something applied inside an edit's span, in original coordinates
#[derive(Debug, Clone, Copy)]
pub(crate) enum Item {
    Child(usize),
    /// Source text of a move edit, removed by the edit hosting it
    MoveSource(EditRange),
}

/// Children and hosted move sources of `edit`, sorted by document order
pub(crate) fn items(edit: &TextEdit, hosted: Option<&Vec<EditRange>>) -> Vec<(EditRange, Item)> {
    let mut items: Vec<(EditRange, Item)> = edit
        .children()
        .iter()
        .enumerate()
        .map(|(index, child)| (child.range(), Item::Child(index)))
        .collect();
    if let Some(sources) = hosted {
        items.extend(sources.iter().map(|range| (*range, Item::MoveSource(*range))));
    }
    items.sort_by_key(|(range, _)| (range.offset, range.end()));
    items
}

/// Apply `root` and return the length change of its span
pub(crate) fn apply_tree<B: TextBufferMut>(
    root: &mut TextEdit,
    hosted: &HashMap<EditPath, Vec<EditRange>>,
    buffer: &mut B,
) -> Result<isize, ApplyFault> {
    apply_edit(root, &EditPath::root(), hosted, buffer)
}

fn apply_edit<B: TextBufferMut>(
    edit: &mut TextEdit,
    path: &EditPath,
    hosted: &HashMap<EditPath, Vec<EditRange>>,
    buffer: &mut B,
) -> Result<isize, ApplyFault> {
    let mut inner: isize = 0;
    for (range, item) in items(edit, hosted.get(path)).into_iter().rev() {
        match item {
            Item::Child(index) => {
                let child = &mut edit.children_mut()[index];
                inner += apply_edit(child, &path.child(index), hosted, buffer)?;
            }
            Item::MoveSource(source) => {
                tracing::trace!(path = %path, source = %source, "removing move source");
                buffer
                    .replace(source.as_range(), "")
                    .map_err(|err| fault(path, range, err))?;
                inner -= source.length as isize;
            }
        }
    }

    let current = edit.length().checked_add_signed(inner).unwrap_or(0);
    let own = apply_own(edit, current, buffer).map_err(|err| fault(path, edit.range(), err))?;
    let delta = inner + own;
    tracing::trace!(path = %path, kind = edit.kind().name(), delta, "applied edit");
    edit.set_delta(delta);
    Ok(delta)
}

/// Perform the edit's own transform on its span, now `current` chars long
fn apply_own<B: TextBufferMut>(
    edit: &TextEdit,
    current: usize,
    buffer: &mut B,
) -> Result<isize, BufferError> {
    let offset = edit.offset();
    let span = offset..offset + current;
    match edit.kind() {
        EditKind::Multi | EditKind::Marker => Ok(0),
        EditKind::Insert { text } => {
            buffer.replace(offset..offset, text)?;
            Ok(char_len(text))
        }
        EditKind::Copy { text, .. } | EditKind::Move { text, .. } => {
            let text = text.as_deref().unwrap_or_default();
            buffer.replace(offset..offset, text)?;
            Ok(char_len(text))
        }
        EditKind::Replace { text } => {
            buffer.replace(span, text)?;
            Ok(char_len(text) - current as isize)
        }
        EditKind::Delete => {
            buffer.replace(span, "")?;
            Ok(-(current as isize))
        }
    }
}

/// Replay an undo edit, last step first. Returns the length change.
pub(crate) fn apply_undo<B: TextBufferMut>(
    undo: &UndoEdit,
    buffer: &mut B,
) -> Result<isize, ApplyFault> {
    let mut delta: isize = 0;
    for (index, step) in undo.steps.iter().enumerate().rev() {
        buffer
            .replace(step.range().as_range(), &step.text)
            .map_err(|err| fault(&EditPath::root().child(index), step.range(), err))?;
        delta += char_len(&step.text) - step.length as isize;
    }
    Ok(delta)
}

fn char_len(text: &str) -> isize {
    text.chars().count() as isize
}

fn fault(path: &EditPath, range: EditRange, source: BufferError) -> ApplyFault {
    tracing::warn!(path = %path, range = %range, error = %source, "edit could not be applied");
    ApplyFault {
        path: path.clone(),
        range,
        source,
    }
}
