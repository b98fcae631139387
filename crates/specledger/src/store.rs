//! Storage backend behind the persistence worker.
//!
//! The trait is synchronous: the worker task owns the store outright and
//! processes one request at a time, so the backend never needs its own
//! locking. `MemoryStore` is the in-process implementation; anything that
//! can answer these calls (an embedded database, a file-backed index) can
//! stand in behind the same worker.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::{Anchor, NewVersionRecord, VersionRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown version id {0}")]
    UnknownId(u64),
    #[error("unknown anchor {path}:{line}:{pos}")]
    UnknownAnchor { path: String, line: u64, pos: u64 },
}

/// CRUD surface over version records (keyed by document path) and anchors,
/// plus the store-side full-vs-diff policy query.
pub trait SpecStore: Send {
    /// All records for a path, ordered by id. Soft-deleted records are
    /// included: they are hidden from presentation, not from the chain.
    fn versions(&self, path: &str) -> Vec<VersionRecord>;

    /// The newest record for a path, if any.
    fn last_version(&self, path: &str) -> Option<VersionRecord>;

    /// Persist a new record, assigning the next id. Returns the stored row.
    fn add_version(&mut self, record: NewVersionRecord) -> VersionRecord;

    /// Hide a record from normal listing without touching the chain.
    fn soft_delete(&mut self, id: u64) -> Result<(), StoreError>;

    /// Undo a soft delete.
    fn restore(&mut self, id: u64) -> Result<(), StoreError>;

    /// Remove a record outright. Chain-integrity checks happen above the
    /// protocol; the store only performs the removal.
    fn delete_permanently(&mut self, id: u64) -> Result<(), StoreError>;

    /// Whether the next record saved for this path should be a full
    /// snapshot rather than a delta.
    fn is_next_version_full(&self, path: &str) -> bool;

    fn add_anchor(&mut self, anchor: Anchor);

    fn anchors(&self, path: &str) -> Vec<Anchor>;

    fn delete_anchor(&mut self, anchor: &Anchor) -> Result<(), StoreError>;
}

/// Tuning knobs handed to the store at construction.
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// Rebaseline interval: every `rebaseline_every`-th record for a path
    /// is stored as a full snapshot, bounding replay length during
    /// reconstruction. Values below 1 behave as 1 (every record full).
    pub rebaseline_every: u32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { rebaseline_every: 10 }
    }
}

/// In-memory store: a `BTreeMap` keyed by record id, so per-path histories
/// come back in id order for free.
pub struct MemoryStore {
    records: BTreeMap<u64, VersionRecord>,
    anchors: Vec<Anchor>,
    next_id: u64,
    options: StoreOptions,
}

impl MemoryStore {
    pub fn new(options: StoreOptions) -> Self {
        Self {
            records: BTreeMap::new(),
            anchors: Vec::new(),
            next_id: 1,
            options,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

impl SpecStore for MemoryStore {
    fn versions(&self, path: &str) -> Vec<VersionRecord> {
        self.records
            .values()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    fn last_version(&self, path: &str) -> Option<VersionRecord> {
        self.records
            .values()
            .rev()
            .find(|r| r.path == path)
            .cloned()
    }

    fn add_version(&mut self, record: NewVersionRecord) -> VersionRecord {
        let id = self.next_id;
        self.next_id += 1;
        let record = record.into_record(id);
        self.records.insert(id, record.clone());
        record
    }

    fn soft_delete(&mut self, id: u64) -> Result<(), StoreError> {
        let record = self.records.get_mut(&id).ok_or(StoreError::UnknownId(id))?;
        record.soft_deleted = true;
        Ok(())
    }

    fn restore(&mut self, id: u64) -> Result<(), StoreError> {
        let record = self.records.get_mut(&id).ok_or(StoreError::UnknownId(id))?;
        record.soft_deleted = false;
        Ok(())
    }

    fn delete_permanently(&mut self, id: u64) -> Result<(), StoreError> {
        self.records
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::UnknownId(id))
    }

    fn is_next_version_full(&self, path: &str) -> bool {
        let interval = self.options.rebaseline_every.max(1) as usize;
        let trailing_diffs = self
            .records
            .values()
            .rev()
            .filter(|r| r.path == path)
            .take_while(|r| !r.is_full)
            .count();
        let has_any = self.records.values().any(|r| r.path == path);
        !has_any || trailing_diffs + 1 >= interval
    }

    fn add_anchor(&mut self, anchor: Anchor) {
        if !self.anchors.contains(&anchor) {
            self.anchors.push(anchor);
        }
    }

    fn anchors(&self, path: &str) -> Vec<Anchor> {
        self.anchors
            .iter()
            .filter(|a| a.path == path)
            .cloned()
            .collect()
    }

    fn delete_anchor(&mut self, anchor: &Anchor) -> Result<(), StoreError> {
        let before = self.anchors.len();
        self.anchors.retain(|a| a != anchor);
        if self.anchors.len() == before {
            return Err(StoreError::UnknownAnchor {
                path: anchor.path.clone(),
                line: anchor.line,
                pos: anchor.pos,
            });
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
