//! Edit scripts - edit trees and undo edits stored as YAML or JSON.
//!
//! An edit script mirrors the edit tree:
//!
//! ```yaml
//! kind: multi
//! children:
//!   - kind: replace
//!     offset: 0
//!     length: 5
//!     text: Hi
//!   - kind: move
//!     source: { offset: 12, length: 4 }
//!     target: 6
//! ```
//!
//! The format is picked from the file extension: `.json` is JSON, anything
//! else is YAML.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::edit::{EditKind, EditRange, TextEdit};
use crate::undo::UndoEdit;

/// Errors reading or writing scripts and undo files
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("multi edit needs both offset and length, or neither")]
    PartialRange,
}

/// Serialization format of a script file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFormat {
    Yaml,
    Json,
}

impl ScriptFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ScriptFormat::Json,
            _ => ScriptFormat::Yaml,
        }
    }
}

/// Serializable description of one edit and its children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditScript {
    Multi {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offset: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<usize>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<EditScript>,
    },
    Marker {
        offset: usize,
        length: usize,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<EditScript>,
    },
    Insert {
        offset: usize,
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<EditScript>,
    },
    Replace {
        offset: usize,
        length: usize,
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<EditScript>,
    },
    Delete {
        offset: usize,
        length: usize,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<EditScript>,
    },
    Copy {
        source: EditRange,
        target: usize,
    },
    Move {
        source: EditRange,
        target: usize,
    },
}

impl EditScript {
    pub fn from_yaml(text: &str) -> Result<Self, ScriptError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a script, picking the format from the extension
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let text = read(path)?;
        match ScriptFormat::from_path(path) {
            ScriptFormat::Json => Self::from_json(&text),
            ScriptFormat::Yaml => Self::from_yaml(&text),
        }
    }

    /// Build the edit tree this script describes
    pub fn into_edit(self) -> Result<TextEdit, ScriptError> {
        let (edit, children) = match self {
            EditScript::Multi {
                offset,
                length,
                children,
            } => {
                let edit = match (offset, length) {
                    (Some(offset), Some(length)) => TextEdit::multi_with_range(offset, length),
                    (None, None) => TextEdit::multi(),
                    _ => return Err(ScriptError::PartialRange),
                };
                (edit, children)
            }
            EditScript::Marker {
                offset,
                length,
                children,
            } => (TextEdit::marker(offset, length), children),
            EditScript::Insert {
                offset,
                text,
                children,
            } => (TextEdit::insert(offset, text), children),
            EditScript::Replace {
                offset,
                length,
                text,
                children,
            } => (TextEdit::replace(offset, length, text), children),
            EditScript::Delete {
                offset,
                length,
                children,
            } => (TextEdit::delete(offset, length), children),
            EditScript::Copy { source, target } => (TextEdit::copy(source, target), Vec::new()),
            EditScript::Move { source, target } => {
                (TextEdit::move_text(source, target), Vec::new())
            }
        };
        children
            .into_iter()
            .try_fold(edit, |edit, child| Ok(edit.with_child(child.into_edit()?)))
    }

    /// Describe an existing edit tree
    pub fn from_edit(edit: &TextEdit) -> Self {
        let children = || edit.children().iter().map(Self::from_edit).collect();
        let range = edit.range();
        match edit.kind() {
            EditKind::Multi => EditScript::Multi {
                offset: edit.is_defined().then_some(range.offset),
                length: edit.is_defined().then_some(range.length),
                children: children(),
            },
            EditKind::Marker => EditScript::Marker {
                offset: range.offset,
                length: range.length,
                children: children(),
            },
            EditKind::Insert { text } => EditScript::Insert {
                offset: range.offset,
                text: text.clone(),
                children: children(),
            },
            EditKind::Replace { text } => EditScript::Replace {
                offset: range.offset,
                length: range.length,
                text: text.clone(),
                children: children(),
            },
            EditKind::Delete => EditScript::Delete {
                offset: range.offset,
                length: range.length,
                children: children(),
            },
            EditKind::Copy { source, .. } => EditScript::Copy {
                source: *source,
                target: range.offset,
            },
            EditKind::Move { source, .. } => EditScript::Move {
                source: *source,
                target: range.offset,
            },
        }
    }
}

/// Read an undo edit written by [`save_undo`]
pub fn load_undo(path: &Path) -> Result<UndoEdit, ScriptError> {
    let text = read(path)?;
    match ScriptFormat::from_path(path) {
        ScriptFormat::Json => Ok(serde_json::from_str(&text)?),
        ScriptFormat::Yaml => Ok(serde_yaml::from_str(&text)?),
    }
}

/// Write an undo edit, picking the format from the extension
pub fn save_undo(path: &Path, undo: &UndoEdit) -> Result<(), ScriptError> {
    let text = match ScriptFormat::from_path(path) {
        ScriptFormat::Json => serde_json::to_string_pretty(undo)?,
        ScriptFormat::Yaml => serde_yaml::to_string(undo)?,
    };
    std::fs::write(path, text).map_err(|source| ScriptError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn read(path: &Path) -> Result<String, ScriptError> {
    std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.display().to_string(),
        source,
    })
}
