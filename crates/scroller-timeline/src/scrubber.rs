//! Scrubber view model.
//!
//! Everything a renderer needs to draw a history slider for the focused
//! document, and the two actions the slider can send back. Rendering itself
//! lives with the host.

use serde::{Deserialize, Serialize};

use scroller_types::DocumentId;

use crate::{PreviewAddress, TimelineStore};

/// Slider state for one document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrubberView {
    /// Number of retained snapshots.
    pub size: usize,
    /// Highest selectable index (`size - 1`, or 0 when empty).
    pub max: usize,
    /// Initial slider position: the newest snapshot.
    pub value: usize,
    /// True when there is nothing to scrub through.
    pub disabled: bool,
}

impl ScrubberView {
    /// Build the view for `active`, or a disabled view when nothing is focused.
    pub fn for_document(store: &TimelineStore, active: Option<&DocumentId>) -> Self {
        let size = active.map_or(0, |doc| store.size(doc));
        Self::with_size(size)
    }

    /// View for a timeline of `size` snapshots.
    pub fn with_size(size: usize) -> Self {
        let max = size.saturating_sub(1);
        Self {
            size,
            max,
            value: max,
            disabled: size == 0,
        }
    }

    /// Clamp a requested slider index into `[0, max]`.
    pub fn clamp(&self, index: usize) -> usize {
        index.min(self.max)
    }
}

/// A message sent by the scrubber control.
///
/// Serialized as `{"type": "preview", "index": 3}` /
/// `{"type": "apply_snapshot"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScrubberAction {
    /// Show the snapshot at a window index beside the live document.
    Preview { index: usize },
    /// Restore the selected snapshot into the live document. Not implemented:
    /// the recorder never mutates documents.
    #[serde(rename = "apply_snapshot")]
    Apply,
}

impl ScrubberAction {
    /// The preview address this action asks to open, if any.
    ///
    /// Returns `None` when nothing is focused and for [`Apply`](Self::Apply),
    /// which is accepted and ignored.
    pub fn preview_address(&self, active: Option<&DocumentId>) -> Option<PreviewAddress> {
        match self {
            Self::Preview { index } => {
                active.map(|doc| PreviewAddress::new(doc.clone(), *index))
            }
            Self::Apply => {
                tracing::info!(document = ?active, "apply requested; restore is not supported");
                None
            }
        }
    }
}
