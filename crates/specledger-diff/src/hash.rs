//! Structural identity hash for array-element matching.
//!
//! Each JSON value maps to a compact printable token string. Object keys
//! are visited in sorted order, so the hash depends only on content, never
//! on key insertion order. Two array elements with equal hashes are treated
//! as the same element by the differ, which is what makes move detection
//! possible without duplicating values in the delta.

use serde_json::Value;

/// Produce the structural hash token for a JSON value.
///
/// - `null` → `"N"`, `true`/`false` → `"T"`/`"F"`
/// - numbers → base-36 of the integer part, sign-prefixed
/// - strings → 32-bit FNV-1a in base-36
/// - arrays → `"[h1;h2;...;]"`
/// - objects → `"{kh1:vh1,kh2:vh2,...,}"` with keys hashed and sorted
pub fn content_hash(value: &Value) -> String {
    match value {
        Value::Null => "N".to_string(),
        Value::Bool(true) => "T".to_string(),
        Value::Bool(false) => "F".to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if i < 0 {
                    format!("-{}", base36(i.unsigned_abs()))
                } else {
                    base36(i as u64)
                }
            } else if let Some(u) = n.as_u64() {
                base36(u)
            } else {
                // Floats collapse onto their integer part; the fraction is
                // mixed in via the string hash of the full rendering.
                format!("f{}", base36(fnv1a(&n.to_string()) as u64))
            }
        }
        Value::String(s) => base36(fnv1a(s) as u64),
        Value::Array(items) => {
            let mut out = String::from("[");
            for item in items {
                out.push_str(&content_hash(item));
                out.push(';');
            }
            out.push(']');
            out
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = String::from("{");
            for key in keys {
                out.push_str(&base36(fnv1a(key) as u64));
                out.push(':');
                out.push_str(&content_hash(&map[key]));
                out.push(',');
            }
            out.push('}');
            out
        }
    }
}

/// 32-bit FNV-1a over the UTF-8 bytes.
fn fnv1a(s: &str) -> u32 {
    let mut state: u32 = 0x811c_9dc5;
    for byte in s.as_bytes() {
        state ^= *byte as u32;
        state = state.wrapping_mul(0x0100_0193);
    }
    state
}

/// Lowercase base-36 rendering, matching the token grammar above.
fn base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

// ── Tests ─────────────────────────────────────────────────────────────────
