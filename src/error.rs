//! Faults raised while checking or applying an edit tree

use thiserror::Error;

use crate::buffer::BufferError;
use crate::edit::{EditPath, EditRange};

/// Why an edit tree is malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaultReason {
    #[error("range starting at {offset} with length {length} overflows")]
    RangeOverflow { offset: usize, length: usize },
    #[error("edit ends at {end} but the document has length {len}")]
    ExceedsDocument { end: usize, len: usize },
    #[error("edit is not contained in its parent {parent}")]
    OutsideParent { parent: EditRange },
    #[error("edit overlaps its preceding sibling {previous}")]
    OverlapsSibling { previous: EditRange },
    #[error("source {source_range} ends beyond the document length {len}")]
    SourceOutsideDocument { source_range: EditRange, len: usize },
    #[error("move source {source_range} lies outside the root edit")]
    SourceOutsideRoot { source_range: EditRange },
    #[error("source {source_range} overlaps the {kind} edit at {target}")]
    SourceOverlapsEdit {
        source_range: EditRange,
        kind: &'static str,
        target: EditRange,
    },
    #[error("move source {source_range} crosses the boundary of {boundary}")]
    SourceCrossesEdit {
        source_range: EditRange,
        boundary: EditRange,
    },
    #[error("move source {source_range} overlaps move source {other}")]
    SourceOverlapsSource { source_range: EditRange, other: EditRange },
}

/// Structural problem in an edit tree, found before the buffer is touched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed edit tree at {path} {range}: {reason}")]
pub struct StructuralFault {
    /// Path of the offending edit
    pub path: EditPath,
    /// Range of the offending edit
    pub range: EditRange,
    pub reason: FaultReason,
}

impl StructuralFault {
    pub fn new(path: EditPath, range: EditRange, reason: FaultReason) -> Self {
        Self {
            path,
            range,
            reason,
        }
    }
}

/// A buffer mutation was rejected while the tree was being applied.
/// The buffer content is undefined afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to apply edit at {path} {range}")]
pub struct ApplyFault {
    pub path: EditPath,
    pub range: EditRange,
    #[source]
    pub source: BufferError,
}

/// Errors returned by [`crate::EditProcessor`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error(transparent)]
    Structural(#[from] StructuralFault),
    #[error(transparent)]
    Apply(#[from] ApplyFault),
    #[error("edit processor has already performed its edits")]
    AlreadyPerformed,
}

impl EditError {
    /// The structural fault, if this error is one
    pub fn as_structural(&self) -> Option<&StructuralFault> {
        match self {
            EditError::Structural(fault) => Some(fault),
            _ => None,
        }
    }
}
