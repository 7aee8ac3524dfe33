//! Edit tree model - ranges, edit kinds and the owned `TextEdit` node.
//!
//! A `TextEdit` covers a half-open character range of the buffer and owns an
//! ordered list of child edits. Children are kept sorted by `(offset, end)`
//! on insertion, so the order in which a caller adds them never matters.
//! Overlaps are not rejected here; the processor's integrity check reports
//! them before any mutation happens.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Half-open character range `[offset, offset + length)` of an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EditRange {
    pub offset: usize,
    pub length: usize,
}

impl EditRange {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// Zero-length range at `offset` (an insertion point)
    pub fn at(offset: usize) -> Self {
        Self { offset, length: 0 }
    }

    /// Exclusive end (`offset + length`), saturating at `usize::MAX`
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }

    /// Exclusive end, or `None` if it does not fit in a `usize`
    pub fn checked_end(&self) -> Option<usize> {
        self.offset.checked_add(self.length)
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn as_range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    /// True if `other` lies completely inside this range
    pub fn contains(&self, other: &EditRange) -> bool {
        other.offset >= self.offset && other.end() <= self.end()
    }

    /// Smallest range covering both
    pub fn union(&self, other: &EditRange) -> EditRange {
        let offset = self.offset.min(other.offset);
        let end = self.end().max(other.end());
        EditRange::new(offset, end - offset)
    }

    /// True if a mutation of `target` would touch text inside this range.
    ///
    /// Non-empty ranges conflict when they share at least one character. An
    /// insertion point conflicts only when it falls strictly inside.
    pub fn conflicts_with(&self, target: &EditRange) -> bool {
        if self.is_empty() {
            return target.offset < self.offset && self.offset < target.end();
        }
        if target.is_empty() {
            return self.offset < target.offset && target.offset < self.end();
        }
        self.offset < target.end() && target.offset < self.end()
    }
}

impl From<Range<usize>> for EditRange {
    fn from(range: Range<usize>) -> Self {
        EditRange::new(range.start, range.end.saturating_sub(range.start))
    }
}

impl fmt::Display for EditRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.offset, self.end())
    }
}

/// Where an edit's span lives after the processor mutated the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Region {
    pub offset: usize,
    pub length: usize,
}

impl Region {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }
}

/// Child-index path from the root to a node. The root is the empty path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct EditPath(Vec<usize>);

impl EditPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of the `index`-th child of this node
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

}

impl From<Vec<usize>> for EditPath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for EditPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "root")?;
        for index in &self.0 {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

/// What an edit does to its span
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditKind {
    /// Groups children; no transform of its own
    Multi,
    /// Tracks a range through the edit; no transform of its own
    Marker,
    /// Inserts text at the edit's offset
    Insert { text: String },
    /// Replaces the edit's span with text
    Replace { text: String },
    /// Removes the edit's span
    Delete,
    /// Inserts a copy of `source` at the edit's offset
    Copy {
        source: EditRange,
        /// Resolved before mutation starts
        text: Option<String>,
    },
    /// Inserts the text of `source` at the edit's offset and removes `source`
    Move {
        source: EditRange,
        /// Resolved before mutation starts
        text: Option<String>,
    },
}

impl EditKind {
    /// Short lowercase name, used in diagnostics and edit scripts
    pub fn name(&self) -> &'static str {
        match self {
            EditKind::Multi => "multi",
            EditKind::Marker => "marker",
            EditKind::Insert { .. } => "insert",
            EditKind::Replace { .. } => "replace",
            EditKind::Delete => "delete",
            EditKind::Copy { .. } => "copy",
            EditKind::Move { .. } => "move",
        }
    }

    /// Multi and Marker edits only carry structure
    pub fn is_structural(&self) -> bool {
        matches!(self, EditKind::Multi | EditKind::Marker)
    }

    /// Source range read by Copy/Move edits
    pub fn source(&self) -> Option<EditRange> {
        match self {
            EditKind::Copy { source, .. } | EditKind::Move { source, .. } => Some(*source),
            _ => None,
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, EditKind::Move { .. })
    }

    /// Text resolved from the source range, if any
    pub fn source_text(&self) -> Option<&str> {
        match self {
            EditKind::Copy { text, .. } | EditKind::Move { text, .. } => text.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn set_source_text(&mut self, resolved: String) {
        if let EditKind::Copy { text, .. } | EditKind::Move { text, .. } = self {
            *text = Some(resolved);
        }
    }
}

/// One node of an edit tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    range: EditRange,
    kind: EditKind,
    children: Vec<TextEdit>,
    /// False for a multi edit whose range still follows its children
    defined: bool,
    /// Length change of the node's span after it was applied
    delta: isize,
    region: Option<Region>,
    /// Span was overwritten by a replacing or deleting ancestor
    deleted: bool,
}

impl TextEdit {
    fn with_kind(range: EditRange, kind: EditKind) -> Self {
        Self {
            range,
            kind,
            children: Vec::new(),
            defined: true,
            delta: 0,
            region: None,
            deleted: false,
        }
    }

    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::with_kind(EditRange::at(offset), EditKind::Insert { text: text.into() })
    }

    pub fn replace(offset: usize, length: usize, text: impl Into<String>) -> Self {
        Self::with_kind(
            EditRange::new(offset, length),
            EditKind::Replace { text: text.into() },
        )
    }

    pub fn delete(offset: usize, length: usize) -> Self {
        Self::with_kind(EditRange::new(offset, length), EditKind::Delete)
    }

    /// Copy `source` to the insertion point `target`
    pub fn copy(source: EditRange, target: usize) -> Self {
        Self::with_kind(
            EditRange::at(target),
            EditKind::Copy { source, text: None },
        )
    }

    /// Move `source` to the insertion point `target`
    pub fn move_text(source: EditRange, target: usize) -> Self {
        Self::with_kind(
            EditRange::at(target),
            EditKind::Move { source, text: None },
        )
    }

    pub fn marker(offset: usize, length: usize) -> Self {
        Self::with_kind(EditRange::new(offset, length), EditKind::Marker)
    }

    /// Multi edit whose range is defined by its children
    pub fn multi() -> Self {
        let mut edit = Self::with_kind(EditRange::default(), EditKind::Multi);
        edit.defined = false;
        edit
    }

    /// Multi edit with an explicit range
    pub fn multi_with_range(offset: usize, length: usize) -> Self {
        Self::with_kind(EditRange::new(offset, length), EditKind::Multi)
    }

    /// Builder form of [`TextEdit::add_child`]
    pub fn with_child(mut self, child: TextEdit) -> Self {
        self.add_child(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = TextEdit>) -> Self {
        for child in children {
            self.add_child(child);
        }
        self
    }

    /// Insert `child` at its sorted position.
    ///
    /// Children with equal ranges keep insertion order. An undefined multi
    /// grows to cover the new child.
    pub fn add_child(&mut self, child: TextEdit) {
        if !self.defined {
            let footprint = child.footprint();
            self.range = if self.children.is_empty() {
                footprint
            } else {
                self.range.union(&footprint)
            };
        }
        let key = (child.range.offset, child.range.end());
        let index = self
            .children
            .partition_point(|c| (c.range.offset, c.range.end()) <= key);
        self.children.insert(index, child);
    }

    pub fn range(&self) -> EditRange {
        self.range
    }

    pub fn offset(&self) -> usize {
        self.range.offset
    }

    pub fn length(&self) -> usize {
        self.range.length
    }

    /// Exclusive end (`offset + length`)
    pub fn end(&self) -> usize {
        self.range.end()
    }

    pub fn kind(&self) -> &EditKind {
        &self.kind
    }

    pub fn children(&self) -> &[TextEdit] {
        &self.children
    }

    /// False only for a multi edit created with [`TextEdit::multi`] that no
    /// processor has defined yet
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Post-edit location, set when the processor runs with region updates.
    /// `None` for a deleted edit.
    pub fn region(&self) -> Option<Region> {
        self.region
    }

    /// True once region updating found that a replacing or deleting
    /// ancestor overwrote this edit's span
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Range of the node plus every move source in its subtree
    pub fn footprint(&self) -> EditRange {
        let mut footprint = self.range;
        if let EditKind::Move { source, .. } = &self.kind {
            footprint = footprint.union(source);
        }
        for child in &self.children {
            footprint = footprint.union(&child.footprint());
        }
        footprint
    }

    /// Node at `path`, if the path exists
    pub fn node_at(&self, path: &EditPath) -> Option<&TextEdit> {
        path.indices()
            .iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    /// Number of nodes in this subtree, the node included
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TextEdit::node_count).sum::<usize>()
    }

    pub(crate) fn node_at_mut(&mut self, path: &EditPath) -> Option<&mut TextEdit> {
        path.indices()
            .iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }

    pub(crate) fn kind_mut(&mut self) -> &mut EditKind {
        &mut self.kind
    }

    pub(crate) fn children_mut(&mut self) -> &mut [TextEdit] {
        &mut self.children
    }

    pub(crate) fn delta(&self) -> isize {
        self.delta
    }

    pub(crate) fn set_delta(&mut self, delta: isize) {
        self.delta = delta;
    }

    pub(crate) fn set_region(&mut self, region: Region) {
        self.region = Some(region);
        self.deleted = false;
    }

    /// Drop the region of this edit and its whole subtree
    pub(crate) fn mark_deleted(&mut self) {
        self.region = None;
        self.deleted = true;
        for child in &mut self.children {
            child.mark_deleted();
        }
    }

    /// Fix the range of every undefined multi edit in this subtree.
    ///
    /// A multi with children covers their footprints; an empty one becomes
    /// an insertion point at `parent_offset`.
    pub(crate) fn define_regions(&mut self, parent_offset: usize) {
        let own_offset = if self.defined {
            self.range.offset
        } else {
            parent_offset
        };
        for child in &mut self.children {
            child.define_regions(own_offset);
        }
        self.children
            .sort_by_key(|c| (c.range.offset, c.range.end()));
        if !self.defined {
            self.range = Self::coverage(&self.children).unwrap_or(EditRange::at(parent_offset));
            self.defined = true;
        }
    }

    fn coverage(children: &[TextEdit]) -> Option<EditRange> {
        children
            .iter()
            .map(TextEdit::footprint)
            .reduce(|acc, range| acc.union(&range))
    }
}
