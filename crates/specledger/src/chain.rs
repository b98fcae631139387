//! Chain reconstruction: materialize a version's content from stored
//! records.
//!
//! Reconstruction is lazy and uncached; callers that need many historical
//! states pay the replay each time. Soft-deleted records participate fully,
//! both as bases and as intermediate links.

use serde_json::Value;

use crate::codec;
use crate::error::EngineError;
use crate::model::VersionRecord;

/// Materialize the content of the record `target_id` out of `records`,
/// the full history of one path ordered by id.
///
/// Scans backward from the target to the nearest full snapshot (inclusive),
/// decodes it as the base, then replays every intermediate delta forward.
pub fn reconstruct(records: &[VersionRecord], target_id: u64) -> Result<Value, EngineError> {
    let target_idx = records
        .iter()
        .position(|r| r.id == target_id)
        .ok_or(EngineError::NotFound(target_id))?;

    let base_idx = records[..=target_idx]
        .iter()
        .rposition(|r| r.is_full)
        .ok_or_else(|| {
            EngineError::ChainIntegrity(format!(
                "no full snapshot precedes version {target_id}"
            ))
        })?;

    let base = &records[base_idx];
    let mut doc = codec::decode_full(&base.diff).map_err(|e| EngineError::CorruptPayload {
        id: base.id,
        reason: e.to_string(),
    })?;

    for record in &records[base_idx + 1..=target_idx] {
        let delta = codec::decode_delta(&record.diff).map_err(|e| EngineError::CorruptPayload {
            id: record.id,
            reason: e.to_string(),
        })?;
        doc = specledger_diff::patch(&doc, &delta).map_err(|e| {
            EngineError::ChainIntegrity(format!(
                "delta of version {} does not apply to its base: {e}",
                record.id
            ))
        })?;
    }

    Ok(doc)
}

/// Whether any later record still depends on `id` as a diff base.
///
/// The record immediately after the candidate settles it: a non-full
/// successor replays through the candidate, a full successor (or none)
/// does not.
pub fn has_dependents(records: &[VersionRecord], id: u64) -> bool {
    match records.iter().position(|r| r.id == id) {
        Some(idx) => records.get(idx + 1).is_some_and(|next| !next.is_full),
        None => false,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use specledger_diff::diff;

    /// Build a stored history out of live document states, full snapshot
    /// every `rebaseline_every` records.
    fn history(states: &[Value], rebaseline_every: usize) -> Vec<VersionRecord> {
        let mut records = Vec::new();
        for (i, state) in states.iter().enumerate() {
            let is_full = i % rebaseline_every == 0;
            let payload = if is_full {
                codec::encode_full(state).unwrap()
            } else {
                let delta = diff(&states[i - 1], state).unwrap();
                codec::encode_delta(&delta).unwrap()
            };
            records.push(VersionRecord {
                id: (i + 1) as u64,
                path: "spec.yaml".into(),
                name: format!("save {}", i + 1),
                version: format!("1.{i}.0"),
                diff: payload,
                is_full,
                created_at: Utc::now(),
                soft_deleted: false,
            });
        }
        records
    }

    fn states(n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| {
                json!({
                    "openapi": "3.0.0",
                    "revision": i,
                    "paths": (0..=i).map(|k| format!("/route-{k}")).collect::<Vec<_>>(),
                })
            })
            .collect()
    }

    #[test]
    fn full_record_decodes_without_replay() {
        let states = states(1);
        let records = history(&states, 3);
        assert_eq!(reconstruct(&records, 1).unwrap(), states[0]);
    }

    #[test]
    fn every_link_of_a_chain_reconstructs() {
        let states = states(8);
        let records = history(&states, 4);
        for (i, state) in states.iter().enumerate() {
            let id = (i + 1) as u64;
            assert_eq!(&reconstruct(&records, id).unwrap(), state, "version {id}");
        }
    }

    #[test]
    fn full_reconstruction_ignores_other_records() {
        let states = states(6);
        let records = history(&states, 3);
        // Record 4 is full; earlier records must not affect it.
        assert!(records[3].is_full);
        assert_eq!(reconstruct(&records[3..], 4).unwrap(), states[3]);
        assert_eq!(reconstruct(&records, 4).unwrap(), states[3]);
    }

    #[test]
    fn soft_deleted_links_still_replay() {
        let states = states(4);
        let mut records = history(&states, 4);
        records[0].soft_deleted = true;
        records[2].soft_deleted = true;
        assert_eq!(reconstruct(&records, 4).unwrap(), states[3]);
    }

    #[test]
    fn unknown_target_is_not_found() {
        let records = history(&states(2), 2);
        assert!(matches!(
            reconstruct(&records, 99),
            Err(EngineError::NotFound(99))
        ));
    }

    #[test]
    fn corrupt_payload_is_fatal_for_that_version_only() {
        let states = states(3);
        let mut records = history(&states, 3);
        records[1].diff = vec![0xde, 0xad, 0xbe, 0xef];
        assert!(matches!(
            reconstruct(&records, 2),
            Err(EngineError::CorruptPayload { id: 2, .. })
        ));
        assert!(matches!(
            reconstruct(&records, 3),
            Err(EngineError::CorruptPayload { id: 2, .. })
        ));
        // The base itself is untouched.
        assert_eq!(reconstruct(&records, 1).unwrap(), states[0]);
    }

    #[test]
    fn missing_base_is_a_chain_error() {
        let states = states(3);
        let mut records = history(&states, 3);
        records.remove(0);
        assert!(matches!(
            reconstruct(&records, 2),
            Err(EngineError::ChainIntegrity(_))
        ));
    }

    #[test]
    fn dependents_follow_the_next_record_rule() {
        let states = states(5);
        let records = history(&states, 3);
        // ids: 1 full, 2 diff, 3 diff, 4 full, 5 diff
        assert!(has_dependents(&records, 1));
        assert!(has_dependents(&records, 2));
        assert!(!has_dependents(&records, 3)); // next is full
        assert!(has_dependents(&records, 4));
        assert!(!has_dependents(&records, 5)); // terminal
        assert!(!has_dependents(&records, 99));
    }
}
