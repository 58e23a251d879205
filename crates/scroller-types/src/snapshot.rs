//! Captured document states.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// An immutable captured full-text state of a document.
///
/// Snapshots have no identity of their own beyond their place in a timeline.
/// `seq` is the absolute position within that document's history: it is
/// assigned once at commit time and is never reused, so it stays stable after
/// older snapshots are evicted. Window indices (0 = oldest surviving) are not.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Full document content at capture time.
    pub text: Arc<str>,
    /// Capture instant, milliseconds since the Unix epoch. Display/ordering only.
    pub timestamp: u64,
    /// Absolute per-document sequence number.
    pub seq: u64,
}

impl Snapshot {
    pub fn new(text: impl Into<Arc<str>>, timestamp: u64, seq: u64) -> Self {
        Self {
            text: text.into(),
            timestamp,
            seq,
        }
    }

    /// Length of the captured text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// Returns 0 if the system clock reads earlier than the epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
