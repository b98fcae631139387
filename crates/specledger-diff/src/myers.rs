//! Myers O(ND) difference over generic item sequences.
//!
//! One core drives both the character-level text differ and the
//! array-element alignment in the structural differ. Output is a run-length
//! edit script; callers keep their own cursors into the source and
//! destination sequences.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EditKind {
    Eql,
    Del,
    Ins,
}

/// A run of consecutive same-kind edits.
///
/// `Eql` advances both sequences, `Del` only the source, `Ins` only the
/// destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EditRun {
    pub kind: EditKind,
    pub len: usize,
}

/// Diff two sequences into a run-length edit script.
pub(crate) fn diff_slices<T: PartialEq>(a: &[T], b: &[T]) -> Vec<EditRun> {
    let mut runs = Vec::new();
    diff_rec(a, b, &mut runs);
    runs
}

/// Append a run, merging into the previous one when the kind matches.
fn push(out: &mut Vec<EditRun>, kind: EditKind, len: usize) {
    if len == 0 {
        return;
    }
    if let Some(last) = out.last_mut() {
        if last.kind == kind {
            last.len += len;
            return;
        }
    }
    out.push(EditRun { kind, len });
}

fn common_prefix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

fn find_subslice<T: PartialEq>(haystack: &[T], needle: &[T]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn diff_rec<T: PartialEq>(a: &[T], b: &[T], out: &mut Vec<EditRun>) {
    let pre = common_prefix(a, b);
    let (a, b) = (&a[pre..], &b[pre..]);
    let suf = common_suffix(a, b);
    let (a_mid, b_mid) = (&a[..a.len() - suf], &b[..b.len() - suf]);

    push(out, EditKind::Eql, pre);
    diff_middle(a_mid, b_mid, out);
    push(out, EditKind::Eql, suf);
}

/// Diff two sequences that share no common affix.
fn diff_middle<T: PartialEq>(a: &[T], b: &[T], out: &mut Vec<EditRun>) {
    if a.is_empty() {
        push(out, EditKind::Ins, b.len());
        return;
    }
    if b.is_empty() {
        push(out, EditKind::Del, a.len());
        return;
    }

    // Containment fast path: the shorter sequence appears whole inside the
    // longer one.
    let (long, short, long_is_a) = if a.len() > b.len() {
        (a, b, true)
    } else {
        (b, a, false)
    };
    if let Some(idx) = find_subslice(long, short) {
        let extra = if long_is_a { EditKind::Del } else { EditKind::Ins };
        push(out, extra, idx);
        push(out, EditKind::Eql, short.len());
        push(out, extra, long.len() - idx - short.len());
        return;
    }

    if short.len() == 1 {
        // A lone unmatched item: full replacement is already minimal.
        push(out, EditKind::Del, a.len());
        push(out, EditKind::Ins, b.len());
        return;
    }

    bisect(a, b, out);
}

/// Find the middle snake of the optimal path by walking the edit graph from
/// both ends at once, then recurse on the two halves.
fn bisect<T: PartialEq>(a: &[T], b: &[T], out: &mut Vec<EditRun>) {
    let n = a.len() as i64;
    let m = b.len() as i64;
    let max_d = (a.len() + b.len()).div_ceil(2) + 1;
    let v_offset = max_d as i64;
    let v_len = 2 * max_d;

    let mut v1: Vec<i64> = vec![-1; v_len];
    let mut v2: Vec<i64> = vec![-1; v_len];
    v1[max_d + 1] = 0;
    v2[max_d + 1] = 0;

    let delta = n - m;
    // When the total length difference is odd, overlaps can only be spotted
    // on the forward walk.
    let front = delta % 2 != 0;

    let mut k1_start = 0i64;
    let mut k1_end = 0i64;
    let mut k2_start = 0i64;
    let mut k2_end = 0i64;

    for d in 0..max_d as i64 {
        // Forward walk.
        let mut k1 = -d + k1_start;
        while k1 <= d - k1_end {
            let k1_idx = (v_offset + k1) as usize;
            let mut x = if k1 == -d || (k1 != d && v1[k1_idx - 1] < v1[k1_idx + 1]) {
                v1[k1_idx + 1]
            } else {
                v1[k1_idx - 1] + 1
            };
            let mut y = x - k1;
            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            v1[k1_idx] = x;
            if x > n {
                k1_end += 2;
            } else if y > m {
                k1_start += 2;
            } else if front {
                let k2_idx = v_offset + delta - k1;
                if k2_idx >= 0 && (k2_idx as usize) < v_len && v2[k2_idx as usize] != -1 {
                    // Mirror the reverse walk onto forward coordinates.
                    let x2 = n - v2[k2_idx as usize];
                    if x >= x2 {
                        split(a, b, x as usize, y as usize, out);
                        return;
                    }
                }
            }
            k1 += 2;
        }

        // Reverse walk.
        let mut k2 = -d + k2_start;
        while k2 <= d - k2_end {
            let k2_idx = (v_offset + k2) as usize;
            let mut x = if k2 == -d || (k2 != d && v2[k2_idx - 1] < v2[k2_idx + 1]) {
                v2[k2_idx + 1]
            } else {
                v2[k2_idx - 1] + 1
            };
            let mut y = x - k2;
            while x < n && y < m && a[(n - 1 - x) as usize] == b[(m - 1 - y) as usize] {
                x += 1;
                y += 1;
            }
            v2[k2_idx] = x;
            if x > n {
                k2_end += 2;
            } else if y > m {
                k2_start += 2;
            } else if !front {
                let k1_idx = v_offset + delta - k2;
                if k1_idx >= 0 && (k1_idx as usize) < v_len && v1[k1_idx as usize] != -1 {
                    let x1 = v1[k1_idx as usize];
                    let y1 = x1 - (k1_idx - v_offset);
                    let x2 = n - x;
                    if x1 >= x2 {
                        split(a, b, x1 as usize, y1 as usize, out);
                        return;
                    }
                }
            }
            k2 += 2;
        }
    }

    // The walks never met: no common items survive.
    push(out, EditKind::Del, a.len());
    push(out, EditKind::Ins, b.len());
}

fn split<T: PartialEq>(a: &[T], b: &[T], x: usize, y: usize, out: &mut Vec<EditRun>) {
    diff_rec(&a[..x], &b[..y], out);
    diff_rec(&a[x..], &b[y..], out);
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Replay a run script against the inputs and check both sides
    /// reassemble exactly.
    fn check<T: PartialEq + Clone + std::fmt::Debug>(a: &[T], b: &[T]) {
        let runs = diff_slices(a, b);
        let mut ra: Vec<T> = Vec::new();
        let mut rb: Vec<T> = Vec::new();
        let (mut i, mut j) = (0usize, 0usize);
        for run in &runs {
            match run.kind {
                EditKind::Eql => {
                    ra.extend_from_slice(&a[i..i + run.len]);
                    rb.extend_from_slice(&b[j..j + run.len]);
                    for k in 0..run.len {
                        assert_eq!(a[i + k], b[j + k], "Eql run covers unequal items");
                    }
                    i += run.len;
                    j += run.len;
                }
                EditKind::Del => {
                    ra.extend_from_slice(&a[i..i + run.len]);
                    i += run.len;
                }
                EditKind::Ins => {
                    rb.extend_from_slice(&b[j..j + run.len]);
                    j += run.len;
                }
            }
        }
        assert_eq!(i, a.len());
        assert_eq!(j, b.len());
        assert_eq!(ra, a);
        assert_eq!(rb, b);
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn equal_sequences_single_eql_run() {
        let runs = diff_slices(&chars("hello"), &chars("hello"));
        assert_eq!(
            runs,
            vec![EditRun {
                kind: EditKind::Eql,
                len: 5
            }]
        );
    }

    #[test]
    fn empty_both() {
        assert!(diff_slices::<char>(&[], &[]).is_empty());
    }

    #[test]
    fn insert_only() {
        let runs = diff_slices(&chars(""), &chars("abc"));
        assert_eq!(
            runs,
            vec![EditRun {
                kind: EditKind::Ins,
                len: 3
            }]
        );
    }

    #[test]
    fn delete_only() {
        let runs = diff_slices(&chars("abc"), &chars(""));
        assert_eq!(
            runs,
            vec![EditRun {
                kind: EditKind::Del,
                len: 3
            }]
        );
    }

    #[test]
    fn containment_fast_path() {
        check(&chars("abc"), &chars("xxabcyy"));
        check(&chars("xxabcyy"), &chars("abc"));
    }

    #[test]
    fn replacement_middle() {
        check(&chars("the quick brown fox"), &chars("the slow green fox"));
    }

    #[test]
    fn disjoint_sequences() {
        check(&chars("abcdef"), &chars("uvwxyz"));
    }

    #[test]
    fn interleaved_edits() {
        check(&chars("a1b2c3d4"), &chars("a9b8c7d6e5"));
    }

    #[test]
    fn integer_items() {
        check(&[1, 2, 3, 4, 5], &[1, 4, 2, 3, 5]);
        check(&[1, 2, 3], &[3, 2, 1]);
    }

    #[test]
    fn string_items() {
        let a: Vec<String> = ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
        let b: Vec<String> = ["y", "z", "x"].iter().map(|s| s.to_string()).collect();
        check(&a, &b);
    }

    #[test]
    fn long_sequences() {
        let a: Vec<u32> = (0..200).collect();
        let b: Vec<u32> = (0..200).map(|i| if i % 17 == 0 { i + 1000 } else { i }).collect();
        check(&a, &b);
    }
}
