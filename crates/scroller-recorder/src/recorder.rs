//! Capture coordinator.
//!
//! [`Recorder`] is the one place where classification, scheduling,
//! deduplication, and storage meet. It is a synchronous state machine: feed
//! it [`EditorEvent`]s with the current time, and call
//! [`fire_due`](Recorder::fire_due) when [`deadline`](Recorder::deadline)
//! passes. [`spawn_recorder`](crate::spawn_recorder) wraps it in a tokio task
//! that does exactly that.
//!
//! ```text
//!   Edited ──▶ classify ──┬─ LargeChange ──────────────▶ capture now ─┐
//!                         ├─ NewlineBoundary ─▶ arm 500ms ──▶ fire ───┤
//!                         └─ OrdinaryEdit ────▶ arm 2000ms ─▶ fire ───┤
//!   Saved / ActiveChanged ──▶ reset + capture now ────────────────────┤
//!                                                                     ▼
//!                                          dedup ─▶ TimelineStore::add ─▶ listeners
//! ```
//!
//! Captures read text from a mirror of each live document's latest content,
//! maintained from the events themselves, so a delayed capture records the
//! document as it is when the timer fires, not as it was when it was armed.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::time::Instant;

use scroller_timeline::{DedupFilter, ScrubberView, TimelineStore, resolve_preview};
use scroller_types::{DocumentId, EditorEvent, Snapshot, TextDelta, now_millis};

use crate::{RecorderConfig, Scheduler, Trigger, TriggerClassifier};

/// Records snapshot history for every document the host reports.
pub struct Recorder {
    config: RecorderConfig,
    classifier: TriggerClassifier,
    store: TimelineStore,
    scheduler: Scheduler,
    dedup: DedupFilter,
    /// Latest known text of each live, recorded document.
    live: HashMap<DocumentId, Arc<str>>,
    /// Document that currently has focus.
    active: Option<DocumentId>,
    disposed: bool,
}

impl Recorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            classifier: TriggerClassifier::from_config(&config),
            store: TimelineStore::new(config.max_snapshots),
            scheduler: Scheduler::new(),
            dedup: DedupFilter::new(),
            live: HashMap::new(),
            active: None,
            disposed: false,
            config,
        }
    }

    // =========================================================================
    // Event handling
    // =========================================================================

    /// Process one host event. Returns the snapshot committed as a direct
    /// result, if any (delayed captures commit later, from `fire_due`).
    ///
    /// A pending capture whose deadline is at or before `now` is committed
    /// first, so the event cannot cancel it.
    pub fn handle(&mut self, event: EditorEvent, now: Instant) -> Option<Snapshot> {
        if self.disposed {
            tracing::trace!(kind = event.kind(), "recorder disposed, event dropped");
            return None;
        }

        // An overdue capture commits before anything that arrived after it.
        self.fire_due(now);

        match event {
            EditorEvent::Edited { document, deltas, text } => {
                self.on_edited(document, &deltas, text, now)
            }
            EditorEvent::Saved { document, text } => {
                if !self.track(&document, text) {
                    return None;
                }
                self.scheduler.reset();
                self.capture_now(&document, "saved")
            }
            EditorEvent::ActiveChanged(Some(active)) => {
                self.scheduler.reset();
                self.active = Some(active.document.clone());
                if !self.track(&active.document, active.text) {
                    return None;
                }
                self.capture_now(&active.document, "focused")
            }
            EditorEvent::ActiveChanged(None) => {
                self.scheduler.reset();
                self.active = None;
                None
            }
            EditorEvent::Opened { document, text } => {
                self.track(&document, text);
                None
            }
            EditorEvent::Closed { document } => {
                self.live.remove(&document);
                if self.scheduler.cancel_for(&document) {
                    tracing::debug!(%document, "pending capture cancelled by close");
                }
                if self.active.as_ref() == Some(&document) {
                    self.active = None;
                }
                None
            }
        }
    }

    fn on_edited(
        &mut self,
        document: DocumentId,
        deltas: &[TextDelta],
        text: Arc<str>,
        now: Instant,
    ) -> Option<Snapshot> {
        if !self.track(&document, text) {
            return None;
        }

        let classification = self.classifier.classify(deltas);
        tracing::trace!(
            %document,
            trigger = classification.trigger.as_str(),
            chars_changed = classification.chars_changed,
            "edit classified"
        );

        match classification.trigger {
            Trigger::NoOp => None,
            Trigger::LargeChange => self.capture_now(&document, "large_change"),
            Trigger::NewlineBoundary => {
                self.scheduler
                    .request_delayed(now, self.config.enter_timeout(), &document);
                None
            }
            Trigger::OrdinaryEdit => {
                self.scheduler
                    .request_delayed(now, self.config.idle_timeout(), &document);
                None
            }
        }
    }

    /// Commit the pending delayed capture if it is due at `now`.
    pub fn fire_due(&mut self, now: Instant) -> Option<Snapshot> {
        if self.disposed {
            return None;
        }
        let document = self.scheduler.take_due(now)?;
        self.commit(&document, "idle")
    }

    /// Capture the focused document right now. No-op when nothing has focus.
    pub fn capture_active(&mut self) -> Option<Snapshot> {
        if self.disposed {
            return None;
        }
        let document = self.active.clone()?;
        self.capture_now(&document, "manual")
    }

    /// Remember `text` as the current content of `document`.
    ///
    /// Returns false for schemes the recorder does not record; those are not
    /// mirrored.
    fn track(&mut self, document: &DocumentId, text: Arc<str>) -> bool {
        if !self.config.records_scheme(document.scheme()) {
            tracing::trace!(%document, "scheme not recorded");
            return false;
        }
        self.live.insert(document.clone(), text);
        true
    }

    fn capture_now(&mut self, document: &DocumentId, reason: &'static str) -> Option<Snapshot> {
        let document = self.scheduler.request_immediate(document);
        self.commit(&document, reason)
    }

    /// Dedup, store, and reset the scheduler. Every capture path ends here.
    fn commit(&mut self, document: &DocumentId, reason: &'static str) -> Option<Snapshot> {
        let _span = tracing::debug_span!("capture.commit", %document, reason).entered();

        let Some(text) = self.live.get(document).cloned() else {
            tracing::debug!(%document, reason, "no text known for document, capture skipped");
            return None;
        };

        if !self.dedup.should_commit(document, &text) {
            tracing::trace!(%document, reason, "text unchanged since last snapshot");
            return None;
        }

        let snapshot = self.store.add(document, Arc::clone(&text), now_millis());
        self.dedup.record(document, text);
        self.scheduler.reset();

        tracing::debug!(
            %document,
            reason,
            seq = snapshot.seq,
            bytes = snapshot.len(),
            "snapshot committed"
        );
        Some(snapshot)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Stop recording: cancel the pending capture, drop all change listeners,
    /// and ignore every later event. Reads keep working.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.scheduler.reset();
        self.store.clear_listeners();
        tracing::debug!("recorder disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn store(&self) -> &TimelineStore {
        &self.store
    }

    /// Mutable store access, for registering listeners and clearing timelines.
    pub fn store_mut(&mut self) -> &mut TimelineStore {
        &mut self.store
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// When the pending delayed capture fires, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    /// The focused document.
    pub fn active(&self) -> Option<&DocumentId> {
        self.active.as_ref()
    }

    /// Last text committed to `document` in this session.
    pub fn last_committed(&self, document: &DocumentId) -> Option<&str> {
        self.dedup.last_committed(document)
    }

    /// Empty `document`'s timeline.
    pub fn clear(&mut self, document: &DocumentId) {
        self.store.clear(document);
    }

    /// Scrubber state for the focused document.
    pub fn scrubber(&self) -> ScrubberView {
        ScrubberView::for_document(&self.store, self.active.as_ref())
    }

    /// Resolve a `history://preview?...` address to snapshot text.
    pub fn resolve_preview(&self, uri: &str) -> Arc<str> {
        resolve_preview(&self.store, uri)
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new(RecorderConfig::default())
    }
}
