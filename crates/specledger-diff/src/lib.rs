//! specledger-diff — structural diff and patch for JSON-like documents.
//!
//! Produces ordered, invertible edit scripts ([`Delta`]) between two parsed
//! document states, applies them forward ([`patch`]) and backward
//! ([`unpatch`]). Array elements are matched by structural content hash so
//! relocations become position-only `Move` ops; long string leaves degrade
//! to character-level text patches.

pub mod apply;
pub mod delta;
pub mod diff;
pub mod hash;
pub mod text;

mod myers;

pub use apply::{apply_op, patch, unpatch};
pub use delta::{Delta, DeltaOp, PatchError, Path, TextOp};
pub use diff::diff;
pub use hash::content_hash;
