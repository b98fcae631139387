//! Applying deltas: `patch` replays an edit script forward, `unpatch`
//! replays the inverted script to recover the base.

use serde_json::Value;

use crate::delta::{Delta, DeltaOp, Path, PatchError, TextOp};
use crate::text;

/// Transform `base` into the state the delta describes.
pub fn patch(base: &Value, delta: &Delta) -> Result<Value, PatchError> {
    let mut doc = base.clone();
    for op in &delta.0 {
        apply_op(&mut doc, op)?;
    }
    Ok(doc)
}

/// Recover the base state from a patched result.
pub fn unpatch(result: &Value, delta: &Delta) -> Result<Value, PatchError> {
    patch(result, &delta.invert())
}

/// Apply a single op in place.
pub fn apply_op(doc: &mut Value, op: &DeltaOp) -> Result<(), PatchError> {
    match op {
        DeltaOp::Add { path, value } => insert_at(doc, path, value.clone()),
        DeltaOp::Remove { path, .. } => take_at(doc, path).map(|_| ()),
        DeltaOp::Replace { path, value, .. } => replace_at(doc, path, value.clone()),
        DeltaOp::Move { from, path } => {
            let value = take_at(doc, from)?;
            insert_at(doc, path, value)
        }
        DeltaOp::Edit { path, ops } => edit_at(doc, path, ops),
    }
}

// ── Navigation ────────────────────────────────────────────────────────────

/// Walk to the node holding the last path segment, returning the parent
/// and that segment. An empty path has no parent; callers handle root ops
/// before calling this.
fn parent_mut<'a>(doc: &'a mut Value, path: &Path) -> Result<(&'a mut Value, String), PatchError> {
    let (last, prefix) = match path.split_last() {
        Some(split) => split,
        None => return Err(PatchError::InvalidTarget(path.clone())),
    };
    let mut node = doc;
    for (depth, seg) in prefix.iter().enumerate() {
        node = match node {
            Value::Object(map) => map
                .get_mut(seg)
                .ok_or_else(|| PatchError::NotFound(path[..=depth].to_vec()))?,
            Value::Array(arr) => {
                let idx = parse_index(seg, path)?;
                arr.get_mut(idx)
                    .ok_or_else(|| PatchError::InvalidIndex(path.clone()))?
            }
            _ => return Err(PatchError::InvalidTarget(path[..=depth].to_vec())),
        };
    }
    Ok((node, last.clone()))
}

fn parse_index(seg: &str, path: &Path) -> Result<usize, PatchError> {
    seg.parse()
        .map_err(|_| PatchError::InvalidIndex(path.clone()))
}

// ── Applicators ───────────────────────────────────────────────────────────

fn insert_at(doc: &mut Value, path: &Path, value: Value) -> Result<(), PatchError> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    let (parent, key) = parent_mut(doc, path)?;
    match parent {
        Value::Object(map) => {
            map.insert(key, value);
            Ok(())
        }
        Value::Array(arr) => {
            let idx = parse_index(&key, path)?;
            if idx > arr.len() {
                return Err(PatchError::InvalidIndex(path.clone()));
            }
            arr.insert(idx, value);
            Ok(())
        }
        _ => Err(PatchError::InvalidTarget(path.clone())),
    }
}

fn take_at(doc: &mut Value, path: &Path) -> Result<Value, PatchError> {
    if path.is_empty() {
        return Err(PatchError::InvalidTarget(path.clone()));
    }
    let (parent, key) = parent_mut(doc, path)?;
    match parent {
        Value::Object(map) => map.remove(&key).ok_or_else(|| PatchError::NotFound(path.clone())),
        Value::Array(arr) => {
            let idx = parse_index(&key, path)?;
            if idx >= arr.len() {
                return Err(PatchError::InvalidIndex(path.clone()));
            }
            Ok(arr.remove(idx))
        }
        _ => Err(PatchError::InvalidTarget(path.clone())),
    }
}

fn replace_at(doc: &mut Value, path: &Path, value: Value) -> Result<(), PatchError> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    let (parent, key) = parent_mut(doc, path)?;
    match parent {
        Value::Object(map) => match map.get_mut(&key) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(PatchError::NotFound(path.clone())),
        },
        Value::Array(arr) => {
            let idx = parse_index(&key, path)?;
            match arr.get_mut(idx) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(PatchError::InvalidIndex(path.clone())),
            }
        }
        _ => Err(PatchError::InvalidTarget(path.clone())),
    }
}

fn edit_at(doc: &mut Value, path: &Path, ops: &[TextOp]) -> Result<(), PatchError> {
    let target = if path.is_empty() {
        doc
    } else {
        let (parent, key) = parent_mut(doc, path)?;
        match parent {
            Value::Object(map) => map.get_mut(&key).ok_or_else(|| PatchError::NotFound(path.clone()))?,
            Value::Array(arr) => {
                let idx = parse_index(&key, path)?;
                arr.get_mut(idx)
                    .ok_or_else(|| PatchError::InvalidIndex(path.clone()))?
            }
            _ => return Err(PatchError::InvalidTarget(path.clone())),
        }
    };
    match target {
        Value::String(s) => {
            *s = text::apply(s, ops, path)?;
            Ok(())
        }
        _ => Err(PatchError::NotAString(path.clone())),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
