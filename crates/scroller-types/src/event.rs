//! Events delivered by the host editor.
//!
//! The host translates its own notifications (text changed, saved, focus
//! moved, opened, closed) into [`EditorEvent`]s. Every event that carries
//! text carries the *full post-event* document text, so the recorder never
//! has to call back into the host to read a document.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::DocumentId;

/// One replaced range within an edit batch.
///
/// Offsets are deliberately absent: the recorder only measures edit volume,
/// it never re-applies edits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDelta {
    /// Length of the replaced range, in UTF-16 code units (editor convention).
    pub range_length: usize,
    /// Replacement text.
    pub text: String,
}

impl TextDelta {
    pub fn new(range_length: usize, text: impl Into<String>) -> Self {
        Self {
            range_length,
            text: text.into(),
        }
    }

    /// Pure insertion (empty replaced range).
    pub fn insert(text: impl Into<String>) -> Self {
        Self::new(0, text)
    }

    /// Pure deletion of `len` code units.
    pub fn delete(len: usize) -> Self {
        Self::new(len, String::new())
    }

    /// Length of the inserted text in UTF-16 code units, comparable with
    /// `range_length`.
    pub fn inserted_len(&self) -> usize {
        self.text.encode_utf16().count()
    }

    /// `|inserted − replaced|`: the approximate volume of this delta.
    pub fn volume(&self) -> usize {
        self.inserted_len().abs_diff(self.range_length)
    }

    /// True if the inserted text contains a line break.
    pub fn has_newline(&self) -> bool {
        self.text.contains(['\n', '\r'])
    }
}

/// The newly focused document and its current text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveDocument {
    pub document: DocumentId,
    pub text: Arc<str>,
}

impl ActiveDocument {
    pub fn new(document: impl Into<DocumentId>, text: impl Into<Arc<str>>) -> Self {
        Self {
            document: document.into(),
            text: text.into(),
        }
    }
}

/// Everything the host editor tells the recorder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum EditorEvent {
    /// A document's content changed. `deltas` is one host batch, in order.
    Edited {
        document: DocumentId,
        deltas: Vec<TextDelta>,
        text: Arc<str>,
    },
    /// A document was written to storage.
    Saved { document: DocumentId, text: Arc<str> },
    /// Focus moved to another document, or to nothing.
    ActiveChanged(Option<ActiveDocument>),
    /// A document became known to the host (not necessarily focused).
    Opened { document: DocumentId, text: Arc<str> },
    /// A document was closed by the host.
    Closed { document: DocumentId },
}

/// Discriminant of [`EditorEvent`], for logging.
pub type EventKind = &'static str;

impl EditorEvent {
    /// Convenience constructor for an edit batch.
    pub fn edited(
        document: impl Into<DocumentId>,
        deltas: Vec<TextDelta>,
        text: impl Into<Arc<str>>,
    ) -> Self {
        Self::Edited {
            document: document.into(),
            deltas,
            text: text.into(),
        }
    }

    pub fn saved(document: impl Into<DocumentId>, text: impl Into<Arc<str>>) -> Self {
        Self::Saved {
            document: document.into(),
            text: text.into(),
        }
    }

    pub fn focused(document: impl Into<DocumentId>, text: impl Into<Arc<str>>) -> Self {
        Self::ActiveChanged(Some(ActiveDocument::new(document, text)))
    }

    pub fn unfocused() -> Self {
        Self::ActiveChanged(None)
    }

    pub fn opened(document: impl Into<DocumentId>, text: impl Into<Arc<str>>) -> Self {
        Self::Opened {
            document: document.into(),
            text: text.into(),
        }
    }

    pub fn closed(document: impl Into<DocumentId>) -> Self {
        Self::Closed {
            document: document.into(),
        }
    }

    /// Event name (`"edited"`, `"saved"`, ...).
    pub fn kind(&self) -> EventKind {
        self.into()
    }

    /// The document this event concerns, if any.
    pub fn document(&self) -> Option<&DocumentId> {
        match self {
            Self::Edited { document, .. }
            | Self::Saved { document, .. }
            | Self::Opened { document, .. }
            | Self::Closed { document } => Some(document),
            Self::ActiveChanged(active) => active.as_ref().map(|a| &a.document),
        }
    }
}
