//! Shared types for scroller: the vocabulary every other crate speaks.
//!
//! - [`DocumentId`]: opaque canonical identity of an editor document
//! - [`Snapshot`]: one immutable captured text state
//! - [`TextDelta`] / [`EditorEvent`]: what the host editor feeds the recorder
//!
//! Nothing here does I/O or holds mutable state.

mod event;
mod ids;
mod snapshot;

pub use event::{ActiveDocument, EditorEvent, EventKind, TextDelta};
pub use ids::{DocumentId, SchemeError};
pub use snapshot::{Snapshot, now_millis};
