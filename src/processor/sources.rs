//! Source resolution for copy and move edits.
//!
//! Every Copy/Move edit reads text from elsewhere in the buffer. All of that
//! text is captured from the untouched buffer before the first mutation,
//! since offsets outside an edit's own span stop being reliable once the
//! document updater starts.

use std::collections::HashMap;

use crate::buffer::TextBuffer;
use crate::edit::{EditPath, EditRange, TextEdit};

/// A copy or move edit together with the range it reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceEdit {
    /// Path of the copy/move edit
    pub path: EditPath,
    pub source: EditRange,
    /// Move sources are removed from the buffer after being read
    pub moves: bool,
    /// Deepest structural edit containing a move source; it removes the
    /// source text as part of its own children pass
    pub host: Option<EditPath>,
}

/// Read every source range from the unmutated buffer into its edit
pub(crate) fn compute_sources<B: TextBuffer>(
    root: &mut TextEdit,
    sources: &[SourceEdit],
    buffer: &B,
) {
    for source in sources {
        let text = buffer.slice(source.source.as_range());
        match root.node_at_mut(&source.path) {
            Some(edit) => {
                tracing::trace!(
                    path = %source.path,
                    source = %source.source,
                    chars = source.source.length,
                    "resolved {} source",
                    edit.kind().name()
                );
                edit.kind_mut().set_source_text(text);
            }
            None => tracing::warn!(path = %source.path, "source edit no longer in tree"),
        }
    }
}

/// Move source ranges grouped by the edit that removes them, sorted
pub(crate) fn hosted_deletions(sources: &[SourceEdit]) -> HashMap<EditPath, Vec<EditRange>> {
    let mut deletions: HashMap<EditPath, Vec<EditRange>> = HashMap::new();
    for source in sources.iter().filter(|s| s.moves) {
        if let Some(host) = &source.host {
            deletions
                .entry(host.clone())
                .or_default()
                .push(source.source);
        }
    }
    for ranges in deletions.values_mut() {
        ranges.sort_by_key(|r| (r.offset, r.end()));
    }
    deletions
}
