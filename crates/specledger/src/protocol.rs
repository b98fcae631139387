//! Typed request/response messages for the persistence worker.
//!
//! The closed set of request kinds is a tagged union, so dispatch over the
//! protocol is exhaustiveness-checked at compile time. The serde shape
//! keeps the `{ type, payload: { data } }` envelope of the persisted
//! interface, even though the channel itself is in-process.

use serde::{Deserialize, Serialize};

use crate::model::{Anchor, NewVersionRecord, VersionRecord};

/// A request to the persistence worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum StoreRequest {
    GetVersions { path: String },
    GetLastVersion { path: String },
    AddVersion { record: NewVersionRecord },
    /// Soft delete: flips the hidden flag, the chain is untouched.
    DeleteVersion { id: u64 },
    RestoreVersion { id: u64 },
    DeletePermanently { id: u64 },
    /// Store-side full-vs-diff policy query.
    IsNextVersionFull { path: String },
    AddAnchor { anchor: Anchor },
    GetAnchors { path: String },
    DeleteAnchor { anchor: Anchor },
}

/// The result data inside a successful response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StoreData {
    Versions(Vec<VersionRecord>),
    Version(Option<VersionRecord>),
    NextFull(bool),
    Anchors(Vec<Anchor>),
    Done,
}

/// A response from the persistence worker. Failures travel as data, never
/// as panics across the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum StoreResponse {
    Success { data: StoreData },
    Error { message: String },
}

impl StoreResponse {
    pub fn success(data: StoreData) -> Self {
        StoreResponse::Success { data }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StoreResponse::Error {
            message: message.into(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
