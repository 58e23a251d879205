//! Dedup filter: never store the same text twice in a row.
//!
//! Equality is exact content equality. Length is compared first because it is
//! free; a shared allocation is treated as equal without scanning. No hashing:
//! a hash match could only ever mean "maybe equal" and would need the full
//! comparison anyway.

use std::collections::HashMap;
use std::sync::Arc;

use scroller_types::DocumentId;

/// True if `candidate` should be committed given the last committed text.
///
/// Returns false iff `candidate` is exactly equal to `last_committed`.
pub fn should_commit(candidate: &str, last_committed: Option<&str>) -> bool {
    match last_committed {
        None => true,
        Some(last) => !same_content(candidate, last),
    }
}

fn same_content(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    std::ptr::eq(a.as_ptr(), b.as_ptr()) || a == b
}

/// Remembers the last committed text of every document in a session.
///
/// Keyed per document so that switching A → B → A does not re-commit A's
/// unchanged text just because B was committed in between.
#[derive(Clone, Debug, Default)]
pub struct DedupFilter {
    last_committed: HashMap<DocumentId, Arc<str>>,
}

impl DedupFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Would committing `candidate` to `document` add something new?
    pub fn should_commit(&self, document: &DocumentId, candidate: &str) -> bool {
        should_commit(candidate, self.last_committed(document))
    }

    /// Record that `text` was committed to `document`.
    pub fn record(&mut self, document: &DocumentId, text: Arc<str>) {
        self.last_committed.insert(document.clone(), text);
    }

    /// The last text committed to `document`, if any.
    pub fn last_committed(&self, document: &DocumentId) -> Option<&str> {
        self.last_committed.get(document).map(|t| t.as_ref())
    }
}
