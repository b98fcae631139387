//! Error taxonomy of the version store engine.
//!
//! Failures never cross the worker protocol as panics; the worker answers
//! with `Error` envelopes and the controller folds those, together with
//! engine-side failures, into this one enum. `Display` messages are meant
//! to be shown to a person; presentation itself belongs to the embedding
//! layer.

use thiserror::Error;

use crate::codec::CodecError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The document is identical to the latest saved version; the save is
    /// a failed operation, not a silent success.
    #[error("no new changes to save")]
    NoChange,

    /// The persistence worker answered with an error or the channel to it
    /// is gone.
    #[error("persistence protocol failure: {0}")]
    Protocol(String),

    /// A stored payload failed to decompress or deserialize. Fatal for
    /// reconstructing that one version only.
    #[error("corrupt payload in version {id}: {reason}")]
    CorruptPayload { id: u64, reason: String },

    /// An operation would break, or ran into, a broken diff chain.
    #[error("chain integrity: {0}")]
    ChainIntegrity(String),

    /// The version label does not parse as a semantic version.
    #[error("invalid version label {0:?}")]
    InvalidVersion(String),

    /// The version label is not strictly greater than the path's current
    /// maximum.
    #[error("version {given} is not greater than current {current}")]
    VersionOrder { given: String, current: String },

    /// No record with this id in the path's history.
    #[error("unknown version id {0}")]
    NotFound(u64),

    /// Payload encoding failed before anything was persisted.
    #[error("payload codec failure: {0}")]
    Codec(#[from] CodecError),
}
