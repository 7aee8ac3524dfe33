//! Structural validation of an edit tree.
//!
//! Runs depth first and stops at the first violation. Nothing here touches
//! the buffer; a tree that passes can be applied without any edit reaching
//! outside the span it was given.

use crate::edit::{EditPath, EditRange, TextEdit};
use crate::error::{FaultReason, StructuralFault};
use crate::undo::UndoEdit;

use super::sources::SourceEdit;

/// Check `root` against a document of `document_len` chars.
///
/// On success returns every copy/move source in the tree, with move sources
/// assigned to the edit that removes them.
pub(crate) fn check_tree(
    root: &TextEdit,
    document_len: usize,
) -> Result<Vec<SourceEdit>, StructuralFault> {
    let mut sources = Vec::new();
    check_bounds(root, &EditPath::root())?;
    check_node(root, &EditPath::root(), &mut sources)?;
    if root.end() > document_len {
        return Err(StructuralFault::new(
            EditPath::root(),
            root.range(),
            FaultReason::ExceedsDocument {
                end: root.end(),
                len: document_len,
            },
        ));
    }
    check_sources(root, &mut sources, document_len)?;
    Ok(sources)
}

/// An undo edit only has to fit in the document it restores
pub(crate) fn check_undo(undo: &UndoEdit, document_len: usize) -> Result<(), StructuralFault> {
    overflow(&EditPath::root(), undo.range, undo.range)?;
    for (index, step) in undo.steps.iter().enumerate() {
        overflow(&EditPath::root().child(index), step.range(), step.range())?;
    }
    if undo.range.end() > document_len {
        return Err(StructuralFault::new(
            EditPath::root(),
            undo.range,
            FaultReason::ExceedsDocument {
                end: undo.range.end(),
                len: document_len,
            },
        ));
    }
    Ok(())
}

fn check_node(
    edit: &TextEdit,
    path: &EditPath,
    sources: &mut Vec<SourceEdit>,
) -> Result<(), StructuralFault> {
    let kind = edit.kind();
    if let Some(source) = kind.source() {
        sources.push(SourceEdit {
            path: path.clone(),
            source,
            moves: kind.is_move(),
            host: None,
        });
    }

    let mut previous: Option<EditRange> = None;
    for (index, child) in edit.children().iter().enumerate() {
        let child_path = path.child(index);
        let range = child.range();
        check_bounds(child, &child_path)?;
        if !edit.range().contains(&range) {
            return Err(StructuralFault::new(
                child_path,
                range,
                FaultReason::OutsideParent {
                    parent: edit.range(),
                },
            ));
        }
        if let Some(previous) = previous {
            if previous.end() > range.offset {
                return Err(StructuralFault::new(
                    child_path,
                    range,
                    FaultReason::OverlapsSibling { previous },
                ));
            }
        }
        check_node(child, &child_path, sources)?;
        previous = Some(range);
    }
    Ok(())
}

/// Reject ranges whose end does not fit in a `usize`
fn check_bounds(edit: &TextEdit, path: &EditPath) -> Result<(), StructuralFault> {
    overflow(path, edit.range(), edit.range())?;
    if let Some(source) = edit.kind().source() {
        overflow(path, edit.range(), source)?;
    }
    Ok(())
}

fn overflow(path: &EditPath, range: EditRange, checked: EditRange) -> Result<(), StructuralFault> {
    match checked.checked_end() {
        Some(_) => Ok(()),
        None => Err(StructuralFault::new(
            path.clone(),
            range,
            FaultReason::RangeOverflow {
                offset: checked.offset,
                length: checked.length,
            },
        )),
    }
}

fn check_sources(
    root: &TextEdit,
    sources: &mut [SourceEdit],
    document_len: usize,
) -> Result<(), StructuralFault> {
    for index in 0..sources.len() {
        let source = &sources[index];
        let fault = |reason: FaultReason| {
            let range = root
                .node_at(&source.path)
                .map(TextEdit::range)
                .unwrap_or_default();
            StructuralFault::new(source.path.clone(), range, reason)
        };

        if source.source.end() > document_len {
            return Err(fault(FaultReason::SourceOutsideDocument {
                source_range: source.source,
                len: document_len,
            }));
        }
        if let Some((path, target)) = find_conflict(root, &EditPath::root(), &source.source) {
            tracing::debug!(source = %source.source, target = %path, "source overlaps edit");
            return Err(fault(FaultReason::SourceOverlapsEdit {
                source_range: source.source,
                kind: target.kind().name(),
                target: target.range(),
            }));
        }
        if !source.moves {
            continue;
        }

        if !root.range().contains(&source.source) {
            return Err(fault(FaultReason::SourceOutsideRoot {
                source_range: source.source,
            }));
        }
        if let Some(other) = sources
            .iter()
            .enumerate()
            .find(|(other, s)| *other != index && s.moves && s.source.conflicts_with(&source.source))
            .map(|(_, s)| s.source)
        {
            return Err(fault(FaultReason::SourceOverlapsSource {
                source_range: source.source,
                other,
            }));
        }
        let host = find_host(root, &source.source).map_err(|boundary| {
            fault(FaultReason::SourceCrossesEdit {
                source_range: source.source,
                boundary,
            })
        })?;
        sources[index].host = Some(host);
    }
    Ok(())
}

/// First text-transforming edit whose span the source range touches
fn find_conflict<'t>(
    edit: &'t TextEdit,
    path: &EditPath,
    source: &EditRange,
) -> Option<(EditPath, &'t TextEdit)> {
    if !edit.kind().is_structural() && source.conflicts_with(&edit.range()) {
        return Some((path.clone(), edit));
    }
    edit.children()
        .iter()
        .enumerate()
        .find_map(|(index, child)| find_conflict(child, &path.child(index), source))
}

/// Deepest structural edit containing `source` with no child touching it.
/// Errors with the range of a child the source cuts into.
fn find_host(root: &TextEdit, source: &EditRange) -> Result<EditPath, EditRange> {
    let mut path = EditPath::root();
    let mut edit = root;
    'descend: loop {
        for (index, child) in edit.children().iter().enumerate() {
            let range = child.range();
            if child.kind().is_structural() && range.contains(source) && !range.is_empty() {
                path = path.child(index);
                edit = child;
                continue 'descend;
            }
            if range.conflicts_with(source) || source.conflicts_with(&range) {
                return Err(range);
            }
        }
        return Ok(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::undo::UndoStep;

    fn reason(result: Result<Vec<SourceEdit>, StructuralFault>) -> FaultReason {
        result.unwrap_err().reason
    }

    #[test]
    fn test_valid_tree_passes() {
        let root = TextEdit::multi()
            .with_child(TextEdit::replace(0, 2, "AA"))
            .with_child(TextEdit::replace(8, 2, "BB"));
        assert!(check_tree(&root, 10).unwrap().is_empty());
    }

    #[test]
    fn test_root_exceeds_document() {
        let root = TextEdit::replace(3, 5, "x");
        assert_eq!(
            reason(check_tree(&root, 6)),
            FaultReason::ExceedsDocument { end: 8, len: 6 }
        );
    }

    #[test]
    fn test_overlapping_siblings() {
        let root = TextEdit::multi()
            .with_child(TextEdit::replace(0, 2, "X"))
            .with_child(TextEdit::replace(1, 2, "Y"));
        let fault = check_tree(&root, 6).unwrap_err();
        assert_eq!(fault.path, EditPath::root().child(1));
        assert_eq!(fault.range, EditRange::new(1, 2));
        assert_eq!(
            fault.reason,
            FaultReason::OverlapsSibling {
                previous: EditRange::new(0, 2)
            }
        );
    }

    #[test]
    fn test_child_outside_parent() {
        let root = TextEdit::multi_with_range(2, 4).with_child(TextEdit::delete(5, 3));
        assert_eq!(
            reason(check_tree(&root, 10)),
            FaultReason::OutsideParent {
                parent: EditRange::new(2, 4)
            }
        );
    }

    #[test]
    fn test_nested_fault_reports_deepest_path() {
        let root = TextEdit::multi().with_child(
            TextEdit::multi_with_range(0, 4)
                .with_child(TextEdit::insert(1, "a"))
                .with_child(TextEdit::delete(3, 3)),
        );
        let fault = check_tree(&root, 10).unwrap_err();
        assert_eq!(fault.path, EditPath::from(vec![0, 1]));
    }

    #[test]
    fn test_touching_siblings_allowed() {
        let root = TextEdit::multi()
            .with_child(TextEdit::insert(2, "a"))
            .with_child(TextEdit::insert(2, "b"))
            .with_child(TextEdit::replace(2, 2, "c"))
            .with_child(TextEdit::delete(4, 1));
        assert!(check_tree(&root, 5).is_ok());
    }

    #[test]
    fn test_copy_source_outside_document() {
        let root = TextEdit::multi().with_child(TextEdit::copy(EditRange::new(4, 4), 0));
        assert_eq!(
            reason(check_tree(&root, 6)),
            FaultReason::SourceOutsideDocument {
                source_range: EditRange::new(4, 4),
                len: 6
            }
        );
    }

    #[test]
    fn test_source_overlapping_delete() {
        let root = TextEdit::multi()
            .with_child(TextEdit::copy(EditRange::new(2, 3), 0))
            .with_child(TextEdit::delete(4, 2));
        assert_eq!(
            reason(check_tree(&root, 8)),
            FaultReason::SourceOverlapsEdit {
                source_range: EditRange::new(2, 3),
                kind: "delete",
                target: EditRange::new(4, 2),
            }
        );
    }

    #[test]
    fn test_copy_source_outside_root_allowed() {
        let root = TextEdit::multi_with_range(0, 2).with_child(TextEdit::copy(EditRange::new(5, 3), 1));
        let sources = check_tree(&root, 8).unwrap();
        assert_eq!(sources.len(), 1);
        assert!(!sources[0].moves);
        assert_eq!(sources[0].host, None);
    }

    #[test]
    fn test_move_source_outside_root() {
        let root = TextEdit::multi_with_range(0, 2).with_child(TextEdit::move_text(EditRange::new(5, 3), 1));
        assert_eq!(
            reason(check_tree(&root, 8)),
            FaultReason::SourceOutsideRoot {
                source_range: EditRange::new(5, 3)
            }
        );
    }

    #[test]
    fn test_move_source_host_is_deepest_multi() {
        let root = TextEdit::multi()
            .with_child(TextEdit::move_text(EditRange::new(6, 2), 0))
            .with_child(TextEdit::multi_with_range(4, 6).with_child(TextEdit::delete(9, 1)));
        let sources = check_tree(&root, 10).unwrap();
        assert_eq!(sources[0].host, Some(EditPath::root().child(1)));
    }

    #[test]
    fn test_move_source_crossing_marker() {
        let root = TextEdit::multi()
            .with_child(TextEdit::move_text(EditRange::new(3, 4), 0))
            .with_child(TextEdit::marker(5, 4));
        assert_eq!(
            reason(check_tree(&root, 10)),
            FaultReason::SourceCrossesEdit {
                source_range: EditRange::new(3, 4),
                boundary: EditRange::new(5, 4)
            }
        );
    }

    #[test]
    fn test_overlapping_move_sources() {
        let root = TextEdit::multi()
            .with_child(TextEdit::move_text(EditRange::new(2, 3), 0))
            .with_child(TextEdit::move_text(EditRange::new(4, 3), 9));
        assert_eq!(
            reason(check_tree(&root, 10)),
            FaultReason::SourceOverlapsSource {
                source_range: EditRange::new(2, 3),
                other: EditRange::new(4, 3)
            }
        );
    }

    #[test]
    fn test_overflowing_root_rejected() {
        let root = TextEdit::delete(usize::MAX, 2);
        let fault = check_tree(&root, 10).unwrap_err();
        assert_eq!(fault.path, EditPath::root());
        assert_eq!(
            fault.reason,
            FaultReason::RangeOverflow {
                offset: usize::MAX,
                length: 2
            }
        );
    }

    #[test]
    fn test_overflowing_child_rejected() {
        let root = TextEdit::multi()
            .with_child(TextEdit::insert(0, "a"))
            .with_child(TextEdit::replace(usize::MAX - 1, 5, "b"));
        let fault = check_tree(&root, 10).unwrap_err();
        assert_eq!(fault.path, EditPath::root().child(1));
        assert!(matches!(fault.reason, FaultReason::RangeOverflow { .. }));
    }

    #[test]
    fn test_overflowing_source_rejected() {
        let root = TextEdit::multi()
            .with_child(TextEdit::copy(EditRange::new(usize::MAX, usize::MAX), 0));
        assert_eq!(
            reason(check_tree(&root, 10)),
            FaultReason::RangeOverflow {
                offset: usize::MAX,
                length: usize::MAX
            }
        );
    }

    #[test]
    fn test_overflowing_undo_rejected() {
        let undo = UndoEdit {
            range: EditRange::new(usize::MAX, 1),
            steps: Vec::new(),
        };
        assert!(matches!(
            check_undo(&undo, 10).unwrap_err().reason,
            FaultReason::RangeOverflow { .. }
        ));

        let undo = UndoEdit {
            range: EditRange::new(0, 4),
            steps: vec![UndoStep {
                offset: usize::MAX,
                length: 3,
                text: String::new(),
            }],
        };
        let fault = check_undo(&undo, 10).unwrap_err();
        assert_eq!(fault.path, EditPath::root().child(0));
    }

    #[test]
    fn test_undo_range_checked() {
        let undo = UndoEdit {
            range: EditRange::new(0, 12),
            steps: Vec::new(),
        };
        assert!(check_undo(&undo, 12).is_ok());
        assert!(check_undo(&undo, 11).is_err());
    }
}
