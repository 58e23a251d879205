//! Error types for timeline reads.

use thiserror::Error;

use scroller_types::SchemeError;

/// Why a preview address could not be parsed.
///
/// Callers that only need content use
/// [`resolve_preview`](crate::resolve_preview), which maps every one of these
/// to empty text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreviewError {
    /// Not a URI at all.
    #[error("invalid preview URI: {0}")]
    InvalidUri(#[from] url::ParseError),

    /// URI uses a scheme other than the preview scheme.
    #[error("not a preview URI (scheme {0:?})")]
    WrongScheme(String),

    /// A required query parameter is absent.
    #[error("missing query parameter {0:?}")]
    MissingParameter(&'static str),

    /// `index` or `seq` is not a non-negative integer.
    #[error("invalid {name} value {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    /// Both `index` and `seq` were supplied.
    #[error("preview address has both index and seq")]
    Ambiguous,

    /// The `doc` parameter is not a usable document identity.
    #[error("invalid document identity: {0}")]
    InvalidDocument(#[from] SchemeError),
}
