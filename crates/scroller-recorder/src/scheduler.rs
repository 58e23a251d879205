//! Snapshot scheduler: single-flight debounce state.
//!
//! Tracks "the next scheduled capture", not one per document: only one
//! document is being typed into at a time. A pending capture can be replaced
//! by a request with a *shorter* delay, never by an equal or longer one, so a
//! newline boundary is never pushed back out by the keystrokes after it.
//!
//! The scheduler owns no timer. Callers pass `now` in and ask for
//! [`deadline`](Scheduler::deadline); the async driver sleeps until it and
//! then calls [`take_due`](Scheduler::take_due).
//!
//! ```text
//!   t=0    ordinary edit   → arm 2000ms (deadline 2000)
//!   t=100  newline         → 500 < 2000, re-arm (deadline 600)
//!   t=150  ordinary edit   → 2000 ≥ 500, ignored
//!   t=600  fire            → capture, pending cleared
//! ```

use std::time::Duration;

use tokio::time::Instant;

use scroller_types::DocumentId;

/// The one outstanding delayed capture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingCapture {
    pub document: DocumentId,
    pub delay: Duration,
    pub deadline: Instant,
}

/// Debounce state for the active editing session.
#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Option<PendingCapture>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a capture of `document` after `delay`.
    ///
    /// No-op if a capture is already pending with a delay ≤ `delay`.
    /// Otherwise the pending capture (if any) is replaced. Returns whether a
    /// new capture was armed.
    pub fn request_delayed(&mut self, now: Instant, delay: Duration, document: &DocumentId) -> bool {
        if let Some(pending) = &self.pending {
            if pending.delay <= delay {
                tracing::trace!(
                    %document,
                    pending_ms = pending.delay.as_millis() as u64,
                    requested_ms = delay.as_millis() as u64,
                    "shorter capture already pending"
                );
                return false;
            }
        }

        self.pending = Some(PendingCapture {
            document: document.clone(),
            delay,
            deadline: now + delay,
        });
        tracing::trace!(%document, delay_ms = delay.as_millis() as u64, "capture armed");
        true
    }

    /// Cancel any pending capture and hand back `document` for capture now.
    pub fn request_immediate(&mut self, document: &DocumentId) -> DocumentId {
        self.reset();
        document.clone()
    }

    /// Cancel any pending capture without capturing. Returns what was pending.
    pub fn reset(&mut self) -> Option<PendingCapture> {
        self.pending.take()
    }

    /// Cancel the pending capture if it targets `document`.
    pub fn cancel_for(&mut self, document: &DocumentId) -> bool {
        if self.pending.as_ref().is_some_and(|p| &p.document == document) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// If the pending capture is due at `now`, clear it and return its
    /// document.
    pub fn take_due(&mut self, now: Instant) -> Option<DocumentId> {
        if self.pending.as_ref().is_some_and(|p| p.deadline <= now) {
            self.pending.take().map(|p| p.document)
        } else {
            None
        }
    }

    /// When the pending capture fires, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Delay of the pending capture, or `None` when nothing is pending.
    pub fn current_delay(&self) -> Option<Duration> {
        self.pending.as_ref().map(|p| p.delay)
    }

    pub fn pending(&self) -> Option<&PendingCapture> {
        self.pending.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: Duration = Duration::from_millis(2000);
    const ENTER: Duration = Duration::from_millis(500);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn doc(name: &str) -> DocumentId {
        DocumentId::new(format!("file:///{name}"))
    }

    #[test]
    fn first_request_arms() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();

        assert!(s.request_delayed(t0, IDLE, &doc("a")));
        assert_eq!(s.deadline(), Some(t0 + IDLE));
        assert_eq!(s.current_delay(), Some(IDLE));
    }

    #[test]
    fn equal_delay_does_not_rearm() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();

        s.request_delayed(t0, IDLE, &doc("a"));
        assert!(!s.request_delayed(t0 + ms(300), IDLE, &doc("a")));
        assert_eq!(s.deadline(), Some(t0 + IDLE));
    }

    #[test]
    fn shorter_delay_narrows() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();

        s.request_delayed(t0, IDLE, &doc("a"));
        assert!(s.request_delayed(t0 + ms(100), ENTER, &doc("a")));
        assert_eq!(s.deadline(), Some(t0 + ms(600)));
    }

    #[test]
    fn longer_delay_never_widens() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();

        s.request_delayed(t0, ENTER, &doc("a"));
        assert!(!s.request_delayed(t0 + ms(50), IDLE, &doc("a")));
        assert_eq!(s.deadline(), Some(t0 + ms(500)));
        assert_eq!(s.current_delay(), Some(ENTER));
    }

    #[test]
    fn ignored_request_keeps_original_document() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();

        s.request_delayed(t0, ENTER, &doc("a"));
        s.request_delayed(t0, IDLE, &doc("b"));
        assert_eq!(s.pending().unwrap().document, doc("a"));
    }

    #[test]
    fn take_due_respects_deadline() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.request_delayed(t0, ENTER, &doc("a"));

        assert_eq!(s.take_due(t0 + ms(499)), None);
        assert!(s.is_pending());
        assert_eq!(s.take_due(t0 + ms(500)), Some(doc("a")));
        assert!(!s.is_pending());
        assert_eq!(s.take_due(t0 + ms(10_000)), None);
    }

    #[test]
    fn immediate_cancels_pending() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.request_delayed(t0, IDLE, &doc("a"));

        assert_eq!(s.request_immediate(&doc("a")), doc("a"));
        assert!(!s.is_pending());
        assert_eq!(s.current_delay(), None);
    }

    #[test]
    fn reset_clears_delay_so_long_requests_arm_again() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.request_delayed(t0, ENTER, &doc("a"));

        let cancelled = s.reset().unwrap();
        assert_eq!(cancelled.delay, ENTER);
        assert!(s.request_delayed(t0, IDLE, &doc("a")));
    }

    #[test]
    fn cancel_for_only_matches_target() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.request_delayed(t0, IDLE, &doc("a"));

        assert!(!s.cancel_for(&doc("b")));
        assert!(s.is_pending());
        assert!(s.cancel_for(&doc("a")));
        assert!(!s.is_pending());
    }
}
