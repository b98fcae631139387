//! The versioned-entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One saved version of one tracked document.
///
/// All records sharing a `path` form that document's history, totally
/// ordered by `id`. After creation only `soft_deleted` ever changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    /// Store-assigned, monotonically increasing.
    pub id: u64,
    /// Identity of the tracked document.
    pub path: String,
    /// User-supplied label for this version.
    pub name: String,
    /// Semantic version label; strictly increasing per path.
    pub version: String,
    /// Compressed payload. Decodes to a full snapshot when `is_full`,
    /// otherwise to a delta against the preceding record's reconstructed
    /// state.
    pub diff: Vec<u8>,
    pub is_full: bool,
    pub created_at: DateTime<Utc>,
    /// Hidden from normal listing but still part of the chain.
    pub soft_deleted: bool,
}

/// Insertion form of [`VersionRecord`]; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVersionRecord {
    pub path: String,
    pub name: String,
    pub version: String,
    pub diff: Vec<u8>,
    pub is_full: bool,
    pub created_at: DateTime<Utc>,
    pub soft_deleted: bool,
}

impl NewVersionRecord {
    pub fn into_record(self, id: u64) -> VersionRecord {
        VersionRecord {
            id,
            path: self.path,
            name: self.name,
            version: self.version,
            diff: self.diff,
            is_full: self.is_full,
            created_at: self.created_at,
            soft_deleted: self.soft_deleted,
        }
    }
}

/// A line/position bookmark on a document. Anchors live outside version
/// history: created and deleted by direct user action, keyed by the whole
/// triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub path: String,
    pub line: u64,
    pub pos: u64,
}

// ── Tests ─────────────────────────────────────────────────────────────────
