//! Bounded snapshot timelines for scroller.
//!
//! # Model
//!
//! Each document identity owns a [`Timeline`](store::TimelineStore): an
//! ordered, capacity-bounded run of [`Snapshot`]s, oldest first. Appends that
//! overflow the capacity evict the oldest entry. Index 0 is always the oldest
//! *surviving* snapshot; every snapshot also carries an absolute `seq` that
//! survives eviction.
//!
//! ```text
//!   seq:    0   1   2   3   4   5      capacity = 4
//!          [x] [x] [a] [b] [c] [d]
//!                   ^ index 0   ^ index 3
//! ```
//!
//! # Read surface
//!
//! - [`TimelineStore`]: add / query / clear / change listeners
//! - [`DedupFilter`]: rejects a capture identical to the last committed text
//! - [`PreviewAddress`]: the `history://preview?...` addressing scheme used by
//!   read-only historical views
//! - [`ScrubberView`]: slider bounds for a scrubber control

pub mod dedup;
mod error;
pub mod preview;
pub mod scrubber;
pub mod store;

pub use dedup::{DedupFilter, should_commit};
pub use error::PreviewError;
pub use preview::{PREVIEW_AUTHORITY, PREVIEW_SCHEME, PreviewAddress, Position, resolve_preview};
pub use scrubber::{ScrubberAction, ScrubberView};
pub use store::{ListenerId, MAX_SNAPSHOTS, TimelineChange, TimelineStore};

pub use scroller_types::{DocumentId, Snapshot};
