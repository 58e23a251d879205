//! Snapshot recorder for scroller.
//!
//! Turns a stream of host editor events into per-document snapshot history:
//!
//! - [`classify`] decides how urgent an edit batch is
//! - [`Scheduler`] holds the single-flight debounce
//! - [`Recorder`] ties classification, scheduling, dedup, and the
//!   [`TimelineStore`] together as a synchronous state machine
//! - [`spawn_recorder`] runs a recorder on tokio behind a cloneable
//!   [`RecorderHandle`]
//!
//! # Example
//!
//! ```no_run
//! use scroller_recorder::{EditorEvent, RecorderConfig, spawn_recorder};
//!
//! # async fn demo() -> Result<(), scroller_recorder::RecorderError> {
//! let recorder = spawn_recorder(RecorderConfig::load_or_default());
//! recorder.send(EditorEvent::focused("file:///notes.md", "hello"))?;
//! let history = recorder.get_all(&"file:///notes.md".into()).await?;
//! # let _ = history;
//! # Ok(())
//! # }
//! ```

mod actor;
pub mod classify;
pub mod config;
pub mod constants;
mod recorder;
pub mod scheduler;

pub use actor::{RecorderError, RecorderHandle, spawn_recorder, spawn_with};
pub use classify::{Classification, Trigger, TriggerClassifier, classify};
pub use config::{ConfigError, RecorderConfig};
pub use recorder::Recorder;
pub use scheduler::{PendingCapture, Scheduler};

pub use scroller_timeline::{
    PreviewAddress, ScrubberAction, ScrubberView, TimelineChange, TimelineStore,
};
pub use scroller_types::{ActiveDocument, DocumentId, EditorEvent, Snapshot, TextDelta};
