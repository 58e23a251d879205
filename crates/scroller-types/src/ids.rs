//! Document identity.
//!
//! A [`DocumentId`] is the canonical URI string the host editor uses to
//! address a document (`file:///src/main.rs`, `untitled:Untitled-1`). It is
//! opaque: scroller never normalizes it, so two spellings of the same path
//! are two documents. Rename/move in the host produces a new identity.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Canonical document identity (URI form).
///
/// Cheap to clone; the string is shared.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Arc<str>);

/// Error returned by [`DocumentId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemeError {
    #[error("document identity is empty")]
    Empty,
    #[error("document identity {0:?} has no scheme")]
    MissingScheme(String),
    #[error("document identity {0:?} has an invalid scheme")]
    InvalidScheme(String),
}

impl DocumentId {
    /// Wrap an identity string as-is.
    ///
    /// Use this for identities coming straight from the host editor, which
    /// are canonical by contract.
    pub fn new(uri: impl Into<Arc<str>>) -> Self {
        Self(uri.into())
    }

    /// Parse an identity from untrusted input, requiring a URI scheme.
    pub fn parse(s: &str) -> Result<Self, SchemeError> {
        if s.is_empty() {
            return Err(SchemeError::Empty);
        }
        let Some((scheme, _)) = s.split_once(':') else {
            return Err(SchemeError::MissingScheme(s.to_string()));
        };
        if !is_valid_scheme(scheme) {
            return Err(SchemeError::InvalidScheme(s.to_string()));
        }
        Ok(Self::new(s))
    }

    /// The addressing scheme (text before the first `:`), or `""` if none.
    pub fn scheme(&self) -> &str {
        self.0.split_once(':').map(|(scheme, _)| scheme).unwrap_or("")
    }

    /// The full identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// RFC 3986: `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_is_prefix_before_colon() {
        assert_eq!(DocumentId::new("file:///tmp/a.rs").scheme(), "file");
        assert_eq!(DocumentId::new("untitled:Untitled-1").scheme(), "untitled");
        assert_eq!(DocumentId::new("no-scheme").scheme(), "");
    }

    #[test]
    fn parse_rejects_missing_or_bad_scheme() {
        assert_eq!(DocumentId::parse(""), Err(SchemeError::Empty));
        assert!(matches!(DocumentId::parse("plain"), Err(SchemeError::MissingScheme(_))));
        assert!(matches!(DocumentId::parse("1abc:x"), Err(SchemeError::InvalidScheme(_))));
        assert!(matches!(DocumentId::parse(":x"), Err(SchemeError::InvalidScheme(_))));

        let id = DocumentId::parse("vscode-notebook-cell:/a#b").unwrap();
        assert_eq!(id.scheme(), "vscode-notebook-cell");
    }

    #[test]
    fn distinct_strings_never_collide() {
        let a = DocumentId::new("file:///a");
        let b = DocumentId::new("file:///a/");
        assert_ne!(a, b);
        assert_eq!(a, DocumentId::from("file:///a"));
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = DocumentId::new("file:///x.txt");
        let ron = ron::to_string(&id).unwrap();
        assert_eq!(ron, "\"file:///x.txt\"");
        let back: DocumentId = ron::from_str(&ron).unwrap();
        assert_eq!(back, id);
    }
}
