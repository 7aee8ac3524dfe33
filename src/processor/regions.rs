//! Region tracker - where each edit's span lives after the update.
//!
//! A read-back pass in document order. Every edit is shifted by the summed
//! length changes of everything before it in the buffer; its length grows
//! or shrinks by its own subtree delta. Children of a replace or delete are
//! overwritten along with their parent's span and get no region at all.

use std::collections::HashMap;

use crate::edit::{EditKind, EditPath, EditRange, Region, TextEdit};

use super::updater::{items, Item};

pub(crate) fn update_regions(root: &mut TextEdit, hosted: &HashMap<EditPath, Vec<EditRange>>) {
    relocate(root, &EditPath::root(), hosted, 0);
}

fn relocate(
    edit: &mut TextEdit,
    path: &EditPath,
    hosted: &HashMap<EditPath, Vec<EditRange>>,
    shift: isize,
) {
    let offset = edit.offset().checked_add_signed(shift).unwrap_or(0);
    let length = edit.length().checked_add_signed(edit.delta()).unwrap_or(0);
    edit.set_region(Region::new(offset, length));

    if overwrites_children(edit.kind()) {
        tracing::trace!(path = %path, children = edit.children().len(), "children deleted");
        for child in edit.children_mut() {
            child.mark_deleted();
        }
        return;
    }

    // Inserted text lands in front of the children's text
    let mut shift = shift + inserted_len(edit);
    for (_, item) in items(edit, hosted.get(path)) {
        match item {
            Item::Child(index) => {
                let child = &mut edit.children_mut()[index];
                relocate(child, &path.child(index), hosted, shift);
                shift += child.delta();
            }
            Item::MoveSource(source) => shift -= source.length as isize,
        }
    }
}

fn overwrites_children(kind: &EditKind) -> bool {
    matches!(kind, EditKind::Replace { .. } | EditKind::Delete)
}

fn inserted_len(edit: &TextEdit) -> isize {
    let text = match edit.kind() {
        EditKind::Insert { text } => Some(text.as_str()),
        kind => kind.source_text(),
    };
    text.map_or(0, |text| text.chars().count() as isize)
}
