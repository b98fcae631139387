//! Structural diff: computes the edit script between two document states.
//!
//! Arrays are aligned by structural hash so relocated elements become
//! `Move` ops instead of remove/add pairs, and element edits recurse into
//! the matched slot. String leaves above a size threshold degrade to a
//! character-level text patch instead of whole-value replacement.

use std::collections::{HashMap, VecDeque};

use serde_json::{Map, Value};

use crate::delta::{Delta, DeltaOp};
use crate::hash::content_hash;
use crate::myers::{diff_slices, EditKind};
use crate::text;

/// Compute the delta transforming `old` into `new`.
///
/// Returns `None` when the two states are structurally equal.
pub fn diff(old: &Value, new: &Value) -> Option<Delta> {
    if old == new {
        return None;
    }
    let mut ops = Vec::new();
    diff_values(&mut ops, &[], old, new);
    if ops.is_empty() {
        None
    } else {
        Some(Delta(ops))
    }
}

fn child(path: &[String], seg: String) -> Vec<String> {
    let mut p = path.to_vec();
    p.push(seg);
    p
}

fn diff_values(ops: &mut Vec<DeltaOp>, path: &[String], old: &Value, new: &Value) {
    if old == new {
        return;
    }
    match (old, new) {
        (Value::String(s), Value::String(d)) => diff_string(ops, path, s, d),
        (Value::Object(s), Value::Object(d)) => diff_object(ops, path, s, d),
        (Value::Array(s), Value::Array(d)) => diff_array(ops, path, s, d),
        _ => ops.push(DeltaOp::Replace {
            path: path.to_vec(),
            old: old.clone(),
            value: new.clone(),
        }),
    }
}

// ── Strings ───────────────────────────────────────────────────────────────

fn diff_string(ops: &mut Vec<DeltaOp>, path: &[String], old: &str, new: &str) {
    if old.chars().count() >= text::TEXT_DIFF_MIN_LEN
        && new.chars().count() >= text::TEXT_DIFF_MIN_LEN
    {
        ops.push(DeltaOp::Edit {
            path: path.to_vec(),
            ops: text::diff(old, new),
        });
    } else {
        ops.push(DeltaOp::Replace {
            path: path.to_vec(),
            old: Value::String(old.to_string()),
            value: Value::String(new.to_string()),
        });
    }
}

// ── Objects ───────────────────────────────────────────────────────────────

fn diff_object(
    ops: &mut Vec<DeltaOp>,
    path: &[String],
    old: &Map<String, Value>,
    new: &Map<String, Value>,
) {
    for (key, old_val) in old {
        if !new.contains_key(key) {
            ops.push(DeltaOp::Remove {
                path: child(path, key.clone()),
                old: old_val.clone(),
            });
        }
    }
    for (key, new_val) in new {
        match old.get(key) {
            None => ops.push(DeltaOp::Add {
                path: child(path, key.clone()),
                value: new_val.clone(),
            }),
            Some(old_val) => diff_values(ops, &child(path, key.clone()), old_val, new_val),
        }
    }
}

// ── Arrays ────────────────────────────────────────────────────────────────

/// Where each destination slot comes from.
#[derive(Clone, Copy)]
enum Origin {
    /// Aligned with a source element, content equal.
    Kept(usize),
    /// A source element relocated by identity.
    Moved(usize),
    /// Aligned with a source element whose content changed; recursed into.
    Edited(usize),
    /// No source counterpart.
    New,
}

fn diff_array(ops: &mut Vec<DeltaOp>, path: &[String], old: &[Value], new: &[Value]) {
    let old_hashes: Vec<String> = old.iter().map(content_hash).collect();
    let new_hashes: Vec<String> = new.iter().map(content_hash).collect();
    let runs = diff_slices(&old_hashes, &new_hashes);

    // Expand the run script into per-run index lists, keeping run
    // boundaries for the adjacency pairing below.
    enum Run {
        Eql(Vec<(usize, usize)>),
        Del(Vec<usize>),
        Ins(Vec<usize>),
    }
    let mut expanded = Vec::new();
    let (mut si, mut di) = (0usize, 0usize);
    for run in runs {
        match run.kind {
            EditKind::Eql => {
                expanded.push(Run::Eql((0..run.len).map(|k| (si + k, di + k)).collect()));
                si += run.len;
                di += run.len;
            }
            EditKind::Del => {
                expanded.push(Run::Del((si..si + run.len).collect()));
                si += run.len;
            }
            EditKind::Ins => {
                expanded.push(Run::Ins((di..di + run.len).collect()));
                di += run.len;
            }
        }
    }

    let mut del_used = vec![false; old.len()];
    let mut ins_used = vec![false; new.len()];
    let mut origin = vec![Origin::New; new.len()];

    // Aligned slots. Hashes matched, but equality is re-verified so a hash
    // collision degrades into a recursive edit rather than a missed change.
    for run in &expanded {
        if let Run::Eql(pairs) = run {
            for &(i, j) in pairs {
                origin[j] = if old[i] == new[j] {
                    Origin::Kept(i)
                } else {
                    Origin::Edited(i)
                };
            }
        }
    }

    // Relocations: pair removed and inserted elements with the same
    // identity, first-come on both sides.
    let mut free_dels: HashMap<&str, VecDeque<usize>> = HashMap::new();
    for run in &expanded {
        if let Run::Del(indices) = run {
            for &i in indices {
                free_dels.entry(old_hashes[i].as_str()).or_default().push_back(i);
            }
        }
    }
    for run in &expanded {
        let Run::Ins(indices) = run else { continue };
        for &j in indices {
            let Some(queue) = free_dels.get_mut(new_hashes[j].as_str()) else {
                continue;
            };
            // Skip candidates whose content does not actually match.
            let paired = loop {
                match queue.pop_front() {
                    None => break None,
                    Some(i) if old[i] == new[j] => break Some(i),
                    Some(_) => continue,
                }
            };
            if let Some(i) = paired {
                origin[j] = Origin::Moved(i);
                del_used[i] = true;
                ins_used[j] = true;
            }
        }
    }

    // In-place modifications: a removed run adjacent to an inserted run is
    // the signature of elements edited where they stand; pair them up
    // one-to-one and recurse instead of emitting remove/add churn.
    for w in 1..expanded.len() {
        let (dels, inss) = match (&expanded[w - 1], &expanded[w]) {
            (Run::Del(d), Run::Ins(i)) | (Run::Ins(i), Run::Del(d)) => (d, i),
            _ => continue,
        };
        let free_dels_run: Vec<usize> = dels.iter().copied().filter(|&i| !del_used[i]).collect();
        let free_inss_run: Vec<usize> = inss.iter().copied().filter(|&j| !ins_used[j]).collect();
        for (i, j) in free_dels_run.into_iter().zip(free_inss_run) {
            origin[j] = Origin::Edited(i);
            del_used[i] = true;
            ins_used[j] = true;
        }
    }

    // Phase 1: drop source elements with no destination counterpart,
    // highest index first.
    let mut work: Vec<Option<usize>> = (0..old.len()).map(Some).collect();
    for i in (0..old.len()).rev() {
        let deleted = expanded.iter().any(|run| matches!(run, Run::Del(d) if d.contains(&i)));
        if !deleted || del_used[i] {
            continue;
        }
        if let Some(pos) = work.iter().position(|slot| *slot == Some(i)) {
            ops.push(DeltaOp::Remove {
                path: child(path, pos.to_string()),
                old: old[i].clone(),
            });
            work.remove(pos);
        }
    }

    // Phase 2: walk destination slots in order, inserting new elements and
    // pulling displaced ones into place. Slots already settled never shift
    // again, so emitted indices stay valid as the script replays.
    for (j, slot_origin) in origin.iter().enumerate() {
        match *slot_origin {
            Origin::New => {
                ops.push(DeltaOp::Add {
                    path: child(path, j.to_string()),
                    value: new[j].clone(),
                });
                work.insert(j, None);
            }
            Origin::Kept(i) | Origin::Moved(i) | Origin::Edited(i) => {
                if work.get(j) == Some(&Some(i)) {
                    continue;
                }
                let Some(cur) = work.iter().position(|slot| *slot == Some(i)) else {
                    continue;
                };
                ops.push(DeltaOp::Move {
                    from: child(path, cur.to_string()),
                    path: child(path, j.to_string()),
                });
                let moved = work.remove(cur);
                work.insert(j, moved);
            }
        }
    }

    // Phase 3: recurse into modified slots now that positions are final.
    for (j, slot_origin) in origin.iter().enumerate() {
        if let Origin::Edited(i) = *slot_origin {
            diff_values(ops, &child(path, j.to_string()), &old[i], &new[j]);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
