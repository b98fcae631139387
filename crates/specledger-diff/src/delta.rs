//! Delta model: an ordered, invertible edit script between two document
//! states.
//!
//! Ops apply sequentially; each path addresses the document as left by the
//! preceding ops. Removed and replaced values are carried inside the ops so
//! every delta can be played backwards with [`Delta::invert`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Location of a node in the document tree: object keys and array indices
/// (indices rendered as decimal strings).
pub type Path = Vec<String>;

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq)]
pub enum PatchError {
    #[error("path not found: /{}", .0.join("/"))]
    NotFound(Path),
    #[error("array index out of bounds: /{}", .0.join("/"))]
    InvalidIndex(Path),
    #[error("cannot descend into a leaf value: /{}", .0.join("/"))]
    InvalidTarget(Path),
    #[error("text edit targets a non-string value: /{}", .0.join("/"))]
    NotAString(Path),
    #[error("text edit does not fit the base string: /{}", .0.join("/"))]
    TextMismatch(Path),
}

// ── Ops ───────────────────────────────────────────────────────────────────

/// One step of a text edit script.
///
/// The script walks the base string left to right; positions advance in
/// Unicode scalar values. Deleted text is carried, not just counted, so the
/// script is invertible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOp {
    Retain(usize),
    Insert(String),
    Delete(String),
}

/// A single edit within a [`Delta`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DeltaOp {
    /// Insert a new object key or array element.
    Add { path: Path, value: Value },
    /// Remove an existing node, carrying the removed value.
    Remove { path: Path, old: Value },
    /// Swap the node at `path`, carrying both sides.
    Replace { path: Path, old: Value, value: Value },
    /// Relocate an array element; the value itself is never duplicated.
    /// `from` is resolved first, then the element is re-inserted at `path`.
    Move { from: Path, path: Path },
    /// In-place text edit of a long string leaf.
    Edit { path: Path, ops: Vec<TextOp> },
}

impl DeltaOp {
    /// The inverse op, undoing this one.
    pub fn invert(&self) -> DeltaOp {
        match self {
            DeltaOp::Add { path, value } => DeltaOp::Remove {
                path: path.clone(),
                old: value.clone(),
            },
            DeltaOp::Remove { path, old } => DeltaOp::Add {
                path: path.clone(),
                value: old.clone(),
            },
            DeltaOp::Replace { path, old, value } => DeltaOp::Replace {
                path: path.clone(),
                old: value.clone(),
                value: old.clone(),
            },
            DeltaOp::Move { from, path } => DeltaOp::Move {
                from: path.clone(),
                path: from.clone(),
            },
            DeltaOp::Edit { path, ops } => DeltaOp::Edit {
                path: path.clone(),
                ops: invert_text_ops(ops),
            },
        }
    }
}

/// Invert a text edit script. Text ops are positional along the base
/// string, so the list order is preserved; only the roles flip.
fn invert_text_ops(ops: &[TextOp]) -> Vec<TextOp> {
    ops.iter()
        .map(|op| match op {
            TextOp::Retain(n) => TextOp::Retain(*n),
            TextOp::Insert(s) => TextOp::Delete(s.clone()),
            TextOp::Delete(s) => TextOp::Insert(s.clone()),
        })
        .collect()
}

// ── Delta ─────────────────────────────────────────────────────────────────

/// An ordered list of edits transforming one document state into another.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Delta(pub Vec<DeltaOp>);

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Invert the script so it transforms the result back into the base.
    ///
    /// The op list is reversed (the last applied edit is the first undone)
    /// and each op is individually inverted.
    pub fn invert(&self) -> Delta {
        Delta(self.0.iter().rev().map(DeltaOp::invert).collect())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
