//! specledger — version/diff storage engine for structured documents.
//!
//! Tracks successive versions of a parsed JSON/YAML document without
//! storing a full copy per save: each record is either a full snapshot or
//! a deflated delta against the previous reconstructed state, and any
//! historical version is materialized by replaying the chain from the
//! nearest snapshot. All storage runs behind an isolated worker task
//! reached through a typed request/response protocol, so callers never
//! block on persistence.

pub mod chain;
pub mod codec;
pub mod controller;
pub mod error;
pub mod model;
pub mod protocol;
pub mod store;
pub mod worker;

pub use controller::VersionController;
pub use error::EngineError;
pub use model::{Anchor, NewVersionRecord, VersionRecord};
pub use protocol::{StoreData, StoreRequest, StoreResponse};
pub use store::{MemoryStore, SpecStore, StoreOptions};
pub use worker::StoreClient;
