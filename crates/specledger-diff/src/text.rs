//! Character-level text diffing for long string leaves.
//!
//! Produces full-coverage edit scripts: every character of the base string
//! is accounted for by a `Retain` or a `Delete`, so application never needs
//! separate position fields and the script inverts cleanly. All counts are
//! Unicode scalar values, not bytes.

use crate::delta::{Path, PatchError, TextOp};
use crate::myers::{diff_slices, EditKind};

/// Strings shorter than this (on either side) are replaced whole rather
/// than text-diffed; below this size an edit script rarely beats the
/// replacement it encodes.
pub const TEXT_DIFF_MIN_LEN: usize = 60;

/// Compute a text edit script transforming `src` into `dst`.
pub fn diff(src: &str, dst: &str) -> Vec<TextOp> {
    let a: Vec<char> = src.chars().collect();
    let b: Vec<char> = dst.chars().collect();
    let runs = diff_slices(&a, &b);

    let mut ops = Vec::with_capacity(runs.len());
    let (mut i, mut j) = (0usize, 0usize);
    for run in runs {
        match run.kind {
            EditKind::Eql => {
                ops.push(TextOp::Retain(run.len));
                i += run.len;
                j += run.len;
            }
            EditKind::Del => {
                ops.push(TextOp::Delete(a[i..i + run.len].iter().collect()));
                i += run.len;
            }
            EditKind::Ins => {
                ops.push(TextOp::Insert(b[j..j + run.len].iter().collect()));
                j += run.len;
            }
        }
    }
    ops
}

/// Apply an edit script to a base string.
///
/// The script must cover the base exactly; any mismatch (a `Delete` whose
/// text is not found at the cursor, or a script that over- or under-runs
/// the base) is reported against `path`.
pub fn apply(base: &str, ops: &[TextOp], path: &Path) -> Result<String, PatchError> {
    let chars: Vec<char> = base.chars().collect();
    let mut out = String::with_capacity(base.len());
    let mut cursor = 0usize;

    for op in ops {
        match op {
            TextOp::Retain(n) => {
                let end = cursor + n;
                if end > chars.len() {
                    return Err(PatchError::TextMismatch(path.clone()));
                }
                out.extend(&chars[cursor..end]);
                cursor = end;
            }
            TextOp::Insert(text) => out.push_str(text),
            TextOp::Delete(text) => {
                let len = text.chars().count();
                let end = cursor + len;
                if end > chars.len() || !chars[cursor..end].iter().copied().eq(text.chars()) {
                    return Err(PatchError::TextMismatch(path.clone()));
                }
                cursor = end;
            }
        }
    }

    if cursor != chars.len() {
        return Err(PatchError::TextMismatch(path.clone()));
    }
    Ok(out)
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::DeltaOp;

    fn roundtrip(src: &str, dst: &str) {
        let ops = diff(src, dst);
        let path: Path = vec![];
        assert_eq!(apply(src, &ops, &path).unwrap(), dst, "forward apply");
        let inv = match (DeltaOp::Edit {
            path: path.clone(),
            ops: ops.clone(),
        })
        .invert()
        {
            DeltaOp::Edit { ops, .. } => ops,
            other => panic!("unexpected inverse: {other:?}"),
        };
        assert_eq!(apply(dst, &inv, &path).unwrap(), src, "inverse apply");
    }

    #[test]
    fn simple_edits() {
        roundtrip("hello world", "hello rust");
        roundtrip("abc", "aXc");
        roundtrip("abc", "Xabc");
        roundtrip("abc", "abcX");
        roundtrip("", "abc");
        roundtrip("abc", "");
    }

    #[test]
    fn prose_edit() {
        roundtrip(
            "Returns a list of pets, optionally filtered by status.",
            "Returns a paginated list of pets, filtered by status and owner.",
        );
    }

    #[test]
    fn unicode_counts_scalars() {
        roundtrip("naïve café", "naïve cafés");
        roundtrip("🙂🙂🙂", "🙂🙃🙂");
    }

    #[test]
    fn equal_strings_single_retain() {
        let ops = diff("same", "same");
        assert_eq!(ops, vec![TextOp::Retain(4)]);
    }

    #[test]
    fn delete_mismatch_detected() {
        let ops = vec![TextOp::Delete("xyz".into())];
        let err = apply("abc", &ops, &vec!["d".to_string()]).unwrap_err();
        assert!(matches!(err, PatchError::TextMismatch(_)));
    }

    #[test]
    fn short_script_detected() {
        let ops = vec![TextOp::Retain(1)];
        assert!(apply("abc", &ops, &vec![]).is_err());
    }
}
