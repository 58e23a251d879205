//! Actor wrapper that drives a [`Recorder`] on tokio.
//!
//! The recorder is single-threaded by nature: one task owns it, processes
//! commands in arrival order, and sleeps until the scheduler's deadline in
//! between. [`RecorderHandle`] is the `Send + Sync` front door.
//!
//! ```text
//!   RecorderHandle (Clone)     mpsc       recorder task
//!   ┌─────────────────────┐  ───────▶  ┌──────────────────────────────┐
//!   │ .send(event)        │            │ Recorder                     │
//!   │ .size() / .get_*()  │  ◀───────  │ select! { command | deadline}│
//!   │ .subscribe_changes()│   oneshot  │ store listener ─▶ broadcast  │
//!   └─────────────────────┘            └──────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use scroller_timeline::{ScrubberView, TimelineChange};
use scroller_types::{DocumentId, EditorEvent, Snapshot};

use crate::{Recorder, RecorderConfig};

// ============================================================================
// Error Type
// ============================================================================

/// Errors from the recorder handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecorderError {
    #[error("recorder shut down")]
    Shutdown,
}

// ============================================================================
// Commands (internal)
// ============================================================================

enum RecorderCommand {
    Event(EditorEvent),
    Size {
        document: DocumentId,
        reply: oneshot::Sender<usize>,
    },
    GetByIndex {
        document: DocumentId,
        index: usize,
        reply: oneshot::Sender<Option<Snapshot>>,
    },
    GetBySeq {
        document: DocumentId,
        seq: u64,
        reply: oneshot::Sender<Option<Snapshot>>,
    },
    GetAll {
        document: DocumentId,
        reply: oneshot::Sender<Vec<Snapshot>>,
    },
    ResolvePreview {
        uri: String,
        reply: oneshot::Sender<Arc<str>>,
    },
    Scrubber {
        reply: oneshot::Sender<ScrubberView>,
    },
    Clear {
        document: DocumentId,
        reply: oneshot::Sender<()>,
    },
    CaptureActive {
        reply: oneshot::Sender<Option<Snapshot>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

// ============================================================================
// RecorderHandle (Send + Sync public API)
// ============================================================================

/// Cloneable handle to a recorder task.
#[derive(Clone)]
pub struct RecorderHandle {
    tx: mpsc::UnboundedSender<RecorderCommand>,
    changes: broadcast::Sender<TimelineChange>,
}

impl RecorderHandle {
    // ── Events ───────────────────────────────────────────────────────────

    /// Deliver a host editor event. Never blocks.
    pub fn send(&self, event: EditorEvent) -> Result<(), RecorderError> {
        self.tx
            .send(RecorderCommand::Event(event))
            .map_err(|_| RecorderError::Shutdown)
    }

    /// Capture the focused document now, bypassing the debounce.
    pub async fn capture_active(&self) -> Result<Option<Snapshot>, RecorderError> {
        self.request(|reply| RecorderCommand::CaptureActive { reply }).await
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub async fn size(&self, document: &DocumentId) -> Result<usize, RecorderError> {
        let document = document.clone();
        self.request(|reply| RecorderCommand::Size { document, reply }).await
    }

    pub async fn get_by_index(
        &self,
        document: &DocumentId,
        index: usize,
    ) -> Result<Option<Snapshot>, RecorderError> {
        let document = document.clone();
        self.request(|reply| RecorderCommand::GetByIndex { document, index, reply })
            .await
    }

    pub async fn get_by_seq(
        &self,
        document: &DocumentId,
        seq: u64,
    ) -> Result<Option<Snapshot>, RecorderError> {
        let document = document.clone();
        self.request(|reply| RecorderCommand::GetBySeq { document, seq, reply })
            .await
    }

    pub async fn get_all(&self, document: &DocumentId) -> Result<Vec<Snapshot>, RecorderError> {
        let document = document.clone();
        self.request(|reply| RecorderCommand::GetAll { document, reply }).await
    }

    /// Resolve a `history://preview?...` address; malformed or missing
    /// snapshots give empty text.
    pub async fn resolve_preview(&self, uri: &str) -> Result<Arc<str>, RecorderError> {
        let uri = uri.to_string();
        self.request(|reply| RecorderCommand::ResolvePreview { uri, reply }).await
    }

    /// Scrubber state for the focused document.
    pub async fn scrubber(&self) -> Result<ScrubberView, RecorderError> {
        self.request(|reply| RecorderCommand::Scrubber { reply }).await
    }

    // ── Mutation / lifecycle ─────────────────────────────────────────────

    /// Empty a document's timeline.
    pub async fn clear(&self, document: &DocumentId) -> Result<(), RecorderError> {
        let document = document.clone();
        self.request(|reply| RecorderCommand::Clear { document, reply }).await
    }

    /// Subscribe to timeline changes across all documents.
    ///
    /// Unlike [`TimelineStore::on_change`](scroller_timeline::TimelineStore::on_change)
    /// there is no initial `Attached` message: read current state with
    /// [`size`](Self::size) after subscribing.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<TimelineChange> {
        self.changes.subscribe()
    }

    /// Stop the recorder: cancel pending captures, stop notifications, end
    /// the task. Idempotent.
    pub async fn shutdown(&self) {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(RecorderCommand::Shutdown { reply }).is_ok() {
            let _ = rx.await;
        }
    }

    /// True once the recorder task has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RecorderCommand,
    ) -> Result<T, RecorderError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(build(reply)).map_err(|_| RecorderError::Shutdown)?;
        rx.await.map_err(|_| RecorderError::Shutdown)
    }
}

// ============================================================================
// Spawning
// ============================================================================

/// Spawn a recorder task with `config`. Must be called inside a tokio runtime.
pub fn spawn_recorder(config: RecorderConfig) -> RecorderHandle {
    spawn_with(Recorder::new(config)).0
}

/// Spawn a task around an existing recorder, returning the handle and the
/// task's join handle.
pub fn spawn_with(mut recorder: Recorder) -> (RecorderHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (changes, _) = broadcast::channel(recorder.config().change_channel_capacity.max(1));

    let forward = changes.clone();
    recorder.store_mut().on_change(move |change| {
        if matches!(change, TimelineChange::Attached) {
            return;
        }
        // No subscribers is fine.
        let _ = forward.send(change.clone());
    });

    let task = tokio::spawn(run(recorder, rx));
    (RecorderHandle { tx, changes }, task)
}

// ============================================================================
// Task loop
// ============================================================================

async fn run(mut recorder: Recorder, mut rx: mpsc::UnboundedReceiver<RecorderCommand>) {
    tracing::debug!("recorder task started");

    loop {
        let deadline = recorder.deadline();
        tokio::select! {
            biased;

            command = rx.recv() => {
                let Some(command) = command else {
                    break;
                };
                // The deadline may have passed while this command was queued.
                recorder.fire_due(Instant::now());
                match command {
                    RecorderCommand::Shutdown { reply } => {
                        recorder.dispose();
                        let _ = reply.send(());
                        break;
                    }
                    command => dispatch(&mut recorder, command),
                }
            }
            _ = sleep_until(deadline) => {
                recorder.fire_due(Instant::now());
            }
        }
    }

    recorder.dispose();
    tracing::debug!("recorder task stopped");
}

fn dispatch(recorder: &mut Recorder, command: RecorderCommand) {
    match command {
        RecorderCommand::Event(event) => {
            let _span = tracing::trace_span!("edit.event", kind = event.kind()).entered();
            recorder.handle(event, Instant::now());
        }
        RecorderCommand::Size { document, reply } => {
            let _ = reply.send(recorder.store().size(&document));
        }
        RecorderCommand::GetByIndex { document, index, reply } => {
            let _ = reply.send(recorder.store().get_by_index(&document, index));
        }
        RecorderCommand::GetBySeq { document, seq, reply } => {
            let _ = reply.send(recorder.store().get_by_seq(&document, seq));
        }
        RecorderCommand::GetAll { document, reply } => {
            let _ = reply.send(recorder.store().get_all(&document));
        }
        RecorderCommand::ResolvePreview { uri, reply } => {
            let _ = reply.send(recorder.resolve_preview(&uri));
        }
        RecorderCommand::Scrubber { reply } => {
            let _ = reply.send(recorder.scrubber());
        }
        RecorderCommand::Clear { document, reply } => {
            recorder.clear(&document);
            let _ = reply.send(());
        }
        RecorderCommand::CaptureActive { reply } => {
            let _ = reply.send(recorder.capture_active());
        }
        RecorderCommand::Shutdown { reply } => {
            // Handled by the loop; unreachable in practice.
            let _ = reply.send(());
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use scroller_types::TextDelta;

    use super::*;

    const A: &str = "file:///a.txt";

    fn doc() -> DocumentId {
        DocumentId::new(A)
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_capture_fires_on_tokio_clock() {
        let handle = spawn_recorder(RecorderConfig::default());
        handle
            .send(EditorEvent::edited(A, vec![TextDelta::insert("b")], "ab"))
            .unwrap();

        tokio::time::sleep(Duration::from_millis(1990)).await;
        assert_eq!(handle.size(&doc()).await.unwrap(), 0);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(handle.size(&doc()).await.unwrap(), 1);
        assert_eq!(
            handle.get_by_index(&doc(), 0).await.unwrap().unwrap().text.as_ref(),
            "ab"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn overdue_capture_is_visible_to_late_reads() {
        let handle = spawn_recorder(RecorderConfig::default());
        handle
            .send(EditorEvent::edited(A, vec![TextDelta::insert("b")], "ab"))
            .unwrap();
        tokio::task::yield_now().await;

        tokio::time::advance(Duration::from_millis(2500)).await;
        assert_eq!(handle.size(&doc()).await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn changes_are_broadcast() {
        let handle = spawn_recorder(RecorderConfig::default());
        let mut changes = handle.subscribe_changes();

        handle.send(EditorEvent::focused(A, "hello")).unwrap();
        let change = changes.recv().await.unwrap();
        assert_eq!(
            change,
            TimelineChange::Added { document: doc(), seq: 0, len: 1, evicted: false }
        );

        handle.clear(&doc()).await.unwrap();
        assert_eq!(changes.recv().await.unwrap(), TimelineChange::Cleared { document: doc() });
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_and_closes_handle() {
        let handle = spawn_recorder(RecorderConfig::default());
        let mut changes = handle.subscribe_changes();
        handle
            .send(EditorEvent::edited(A, vec![TextDelta::insert("b")], "ab"))
            .unwrap();

        handle.shutdown().await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(handle.is_closed());
        assert_eq!(handle.size(&doc()).await, Err(RecorderError::Shutdown));
        assert!(handle.send(EditorEvent::saved(A, "x")).is_err());
        // Sender side lives in the handle, so the channel reports empty, not closed.
        assert!(matches!(changes.try_recv(), Err(broadcast::error::TryRecvError::Empty)));

        // Second shutdown is a no-op.
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn preview_and_scrubber_over_handle() {
        let handle = spawn_recorder(RecorderConfig::default());
        handle.send(EditorEvent::focused(A, "v1")).unwrap();
        handle.send(EditorEvent::saved(A, "v2")).unwrap();

        let view = handle.scrubber().await.unwrap();
        assert_eq!(view.size, 2);
        assert!(!view.disabled);

        let uri = scroller_timeline::PreviewAddress::new(A, 0).to_uri();
        assert_eq!(handle.resolve_preview(&uri).await.unwrap().as_ref(), "v1");
        assert_eq!(handle.resolve_preview("history://preview?index=oops").await.unwrap().as_ref(), "");
        assert_eq!(handle.get_by_seq(&doc(), 1).await.unwrap().unwrap().text.as_ref(), "v2");
        assert_eq!(handle.get_all(&doc()).await.unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn capture_active_over_handle() {
        let handle = spawn_recorder(RecorderConfig::default());
        assert_eq!(handle.capture_active().await.unwrap(), None);

        handle.send(EditorEvent::focused(A, "one")).unwrap();
        handle
            .send(EditorEvent::edited(A, vec![TextDelta::insert("!")], "one!"))
            .unwrap();
        let snap = handle.capture_active().await.unwrap().unwrap();
        assert_eq!(snap.text.as_ref(), "one!");
    }
}
