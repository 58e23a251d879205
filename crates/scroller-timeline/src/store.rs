//! Timeline store: per-document bounded snapshot sequences.
//!
//! Replaces a process-global map with an explicit object: one
//! `TimelineStore` is owned by the recorder and everything else reaches it by
//! reference (or through the recorder's handle).

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use scroller_types::{DocumentId, Snapshot};

/// Default per-document capacity.
pub const MAX_SNAPSHOTS: usize = 200;

/// What changed in the store.
///
/// Listeners are not scoped per document: every listener sees every change
/// and decides for itself whether the document it displays is affected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimelineChange {
    /// Sent once to a listener at registration so it can render current state.
    Attached,
    /// A snapshot was appended. `evicted` is set when the append pushed the
    /// oldest entry out.
    Added {
        document: DocumentId,
        seq: u64,
        len: usize,
        evicted: bool,
    },
    /// A document's timeline was emptied.
    Cleared { document: DocumentId },
}

impl TimelineChange {
    /// The document this change concerns (`None` for [`Attached`](Self::Attached)).
    pub fn document(&self) -> Option<&DocumentId> {
        match self {
            Self::Attached => None,
            Self::Added { document, .. } | Self::Cleared { document } => Some(document),
        }
    }
}

/// Handle returned by [`TimelineStore::on_change`], used to unregister.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&TimelineChange) + Send>;

/// One document's history.
#[derive(Debug, Default)]
struct Timeline {
    entries: VecDeque<Snapshot>,
    /// Seq assigned to the next committed snapshot. Never rewinds, not even
    /// on clear.
    next_seq: u64,
}

impl Timeline {
    fn last_timestamp(&self) -> Option<u64> {
        self.entries.back().map(|s| s.timestamp)
    }
}

/// Ordered, size-bounded snapshot timelines keyed by document identity.
///
/// All reads are total: unknown documents behave like empty timelines.
pub struct TimelineStore {
    timelines: HashMap<DocumentId, Timeline>,
    capacity: usize,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl TimelineStore {
    /// Create a store holding at most `capacity` snapshots per document.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            timelines: HashMap::new(),
            capacity: capacity.max(1),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Per-document capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Append a snapshot to `document`'s timeline.
    ///
    /// The caller is responsible for deduplication (see
    /// [`DedupFilter`](crate::DedupFilter)); `add` stores whatever it is given.
    /// A `timestamp` earlier than the newest entry's is clamped up to it so the
    /// timeline stays non-decreasing under wall-clock steps. Listeners run
    /// synchronously after the mutation completes.
    pub fn add(
        &mut self,
        document: &DocumentId,
        text: impl Into<Arc<str>>,
        timestamp: u64,
    ) -> Snapshot {
        let timeline = self.timelines.entry(document.clone()).or_default();

        let timestamp = timeline
            .last_timestamp()
            .map_or(timestamp, |last| timestamp.max(last));
        let snapshot = Snapshot::new(text, timestamp, timeline.next_seq);
        timeline.next_seq += 1;
        timeline.entries.push_back(snapshot.clone());

        let evicted = timeline.entries.len() > self.capacity;
        if evicted {
            timeline.entries.pop_front();
        }
        let len = timeline.entries.len();

        tracing::trace!(%document, seq = snapshot.seq, len, evicted, "snapshot stored");

        self.notify(&TimelineChange::Added {
            document: document.clone(),
            seq: snapshot.seq,
            len,
            evicted,
        });
        snapshot
    }

    /// Empty `document`'s timeline and notify listeners.
    ///
    /// The key is kept: later captures keep accumulating and keep counting
    /// `seq` from where it left off.
    pub fn clear(&mut self, document: &DocumentId) {
        let timeline = self.timelines.entry(document.clone()).or_default();
        let dropped = timeline.entries.len();
        timeline.entries.clear();

        tracing::debug!(%document, dropped, "timeline cleared");

        self.notify(&TimelineChange::Cleared {
            document: document.clone(),
        });
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Snapshot at `index` within the current window (0 = oldest surviving).
    pub fn get_by_index(&self, document: &DocumentId, index: usize) -> Option<Snapshot> {
        self.timelines
            .get(document)
            .and_then(|t| t.entries.get(index))
            .cloned()
    }

    /// Snapshot with absolute sequence number `seq`, if still retained.
    pub fn get_by_seq(&self, document: &DocumentId, seq: u64) -> Option<Snapshot> {
        let timeline = self.timelines.get(document)?;
        let first = timeline.entries.front()?.seq;
        let offset = usize::try_from(seq.checked_sub(first)?).ok()?;
        timeline.entries.get(offset).cloned()
    }

    /// All retained snapshots for `document`, oldest first.
    pub fn get_all(&self, document: &DocumentId) -> Vec<Snapshot> {
        self.timelines
            .get(document)
            .map(|t| t.entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Most recent snapshot for `document`.
    pub fn latest(&self, document: &DocumentId) -> Option<Snapshot> {
        self.timelines
            .get(document)
            .and_then(|t| t.entries.back())
            .cloned()
    }

    /// Number of retained snapshots for `document`.
    pub fn size(&self, document: &DocumentId) -> usize {
        self.timelines.get(document).map_or(0, |t| t.entries.len())
    }

    /// Every document that has ever had a timeline (including cleared ones).
    pub fn documents(&self) -> Vec<DocumentId> {
        let mut ids: Vec<_> = self.timelines.keys().cloned().collect();
        ids.sort();
        ids
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Register a change listener.
    ///
    /// The listener is called once right away with
    /// [`TimelineChange::Attached`], then after every mutation of any
    /// document.
    pub fn on_change<F>(&mut self, mut listener: F) -> ListenerId
    where
        F: FnMut(&TimelineChange) + Send + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;

        listener(&TimelineChange::Attached);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Drop every listener. No notification is delivered afterward until a
    /// new listener registers.
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify(&mut self, change: &TimelineChange) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(change);
        }
    }
}

impl Default for TimelineStore {
    fn default() -> Self {
        Self::new(MAX_SNAPSHOTS)
    }
}

impl std::fmt::Debug for TimelineStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineStore")
            .field("documents", &self.timelines.len())
            .field("capacity", &self.capacity)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
