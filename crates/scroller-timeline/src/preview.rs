//! Preview addressing: the wire contract between the store and read-only
//! historical views.
//!
//! A historical snapshot is addressed as
//!
//! ```text
//! history://preview?index=<window index>&doc=<document identity>
//! history://preview?seq=<absolute seq>&doc=<document identity>
//! ```
//!
//! `index` is relative to the current window (0 = oldest retained) and shifts
//! once eviction starts; `seq` is absolute and stable for as long as the
//! snapshot is retained. The document identity is form-encoded.
//!
//! Resolution never fails the caller: anything malformed or missing resolves
//! to empty text.

use std::borrow::Cow;
use std::sync::Arc;

use scroller_types::DocumentId;
use url::{Url, form_urlencoded};

use crate::{PreviewError, TimelineStore};

/// URI scheme of preview documents.
pub const PREVIEW_SCHEME: &str = "history";

/// Authority part of preview URIs.
pub const PREVIEW_AUTHORITY: &str = "preview";

/// Which snapshot of a timeline to show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    /// Window-relative index (0 = oldest retained).
    Index(usize),
    /// Absolute per-document sequence number.
    Seq(u64),
}

/// A parsed preview address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewAddress {
    pub document: DocumentId,
    pub position: Position,
}

impl PreviewAddress {
    /// Address the snapshot at window `index` of `document`.
    pub fn new(document: impl Into<DocumentId>, index: usize) -> Self {
        Self {
            document: document.into(),
            position: Position::Index(index),
        }
    }

    /// Address the snapshot with absolute `seq` of `document`.
    pub fn at_seq(document: impl Into<DocumentId>, seq: u64) -> Self {
        Self {
            document: document.into(),
            position: Position::Seq(seq),
        }
    }

    /// Render as a `history://preview?...` URI.
    pub fn to_uri(&self) -> String {
        format!("{PREVIEW_SCHEME}://{PREVIEW_AUTHORITY}?{}", self.to_query())
    }

    /// Render just the query string.
    pub fn to_query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        match self.position {
            Position::Index(index) => query.append_pair("index", &index.to_string()),
            Position::Seq(seq) => query.append_pair("seq", &seq.to_string()),
        };
        query.append_pair("doc", self.document.as_str());
        query.finish()
    }

    /// Parse a full preview URI.
    pub fn parse(uri: &str) -> Result<Self, PreviewError> {
        let url = Url::parse(uri)?;
        if url.scheme() != PREVIEW_SCHEME {
            return Err(PreviewError::WrongScheme(url.scheme().to_string()));
        }
        Self::from_query(url.query().unwrap_or(""))
    }

    /// Parse the query part of a preview URI.
    ///
    /// When a parameter repeats, its first value wins.
    pub fn from_query(query: &str) -> Result<Self, PreviewError> {
        let mut index = None;
        let mut seq = None;
        let mut doc = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match &*key {
                "index" => &mut index,
                "seq" => &mut seq,
                "doc" => &mut doc,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }

        let doc = doc.ok_or(PreviewError::MissingParameter("doc"))?;
        let document = DocumentId::parse(&doc)?;

        let position = match (index, seq) {
            (Some(_), Some(_)) => return Err(PreviewError::Ambiguous),
            (Some(index), None) => Position::Index(parse_number("index", &index)?),
            (None, Some(seq)) => Position::Seq(parse_number("seq", &seq)?),
            (None, None) => return Err(PreviewError::MissingParameter("index")),
        };

        Ok(Self { document, position })
    }

    /// Look the addressed snapshot's text up in `store`.
    pub fn lookup(&self, store: &TimelineStore) -> Option<Arc<str>> {
        let snapshot = match self.position {
            Position::Index(index) => store.get_by_index(&self.document, index),
            Position::Seq(seq) => store.get_by_seq(&self.document, seq),
        };
        snapshot.map(|s| s.text)
    }
}

fn parse_number<T: std::str::FromStr>(
    name: &'static str,
    value: &Cow<'_, str>,
) -> Result<T, PreviewError> {
    value.trim().parse().map_err(|_| PreviewError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}

/// Resolve a preview URI to snapshot text.
///
/// Returns empty text for malformed addresses and for snapshots that do not
/// exist (unknown document, index past the window, evicted seq).
pub fn resolve_preview(store: &TimelineStore, uri: &str) -> Arc<str> {
    match PreviewAddress::parse(uri) {
        Ok(address) => address.lookup(store).unwrap_or_else(|| Arc::from("")),
        Err(e) => {
            tracing::debug!(uri, error = %e, "unresolvable preview address");
            Arc::from("")
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn store_with(doc: &str, texts: &[&str]) -> TimelineStore {
        let mut store = TimelineStore::new(3);
        let id = DocumentId::new(doc);
        for (i, text) in texts.iter().enumerate() {
            store.add(&id, *text, i as u64);
        }
        store
    }

    #[test]
    fn uri_encodes_document() {
        let address = PreviewAddress::new("file:///src/a b.rs", 2);
        let uri = address.to_uri();
        assert_eq!(uri, "history://preview?index=2&doc=file%3A%2F%2F%2Fsrc%2Fa+b.rs");
        assert_eq!(PreviewAddress::parse(&uri).unwrap(), address);
    }

    #[test]
    fn seq_addresses_parse() {
        let address = PreviewAddress::at_seq("untitled:Untitled-1", 41);
        assert_eq!(PreviewAddress::parse(&address.to_uri()).unwrap(), address);
    }

    #[test]
    fn unencoded_document_is_accepted() {
        let parsed = PreviewAddress::parse("history://preview?index=0&doc=file:///tmp/x.txt").unwrap();
        assert_eq!(parsed.document.as_str(), "file:///tmp/x.txt");
        assert_eq!(parsed.position, Position::Index(0));
    }

    #[test]
    fn malformed_queries_are_errors() {
        assert!(matches!(
            PreviewAddress::from_query("index=1"),
            Err(PreviewError::MissingParameter("doc"))
        ));
        assert!(matches!(
            PreviewAddress::from_query("doc=file%3A%2F%2F%2Fa"),
            Err(PreviewError::MissingParameter("index"))
        ));
        assert!(matches!(
            PreviewAddress::from_query("index=abc&doc=file%3A%2F%2F%2Fa"),
            Err(PreviewError::InvalidNumber { name: "index", .. })
        ));
        assert!(matches!(
            PreviewAddress::from_query("index=-1&doc=file%3A%2F%2F%2Fa"),
            Err(PreviewError::InvalidNumber { .. })
        ));
        assert!(matches!(
            PreviewAddress::from_query("index=&doc=file%3A%2F%2F%2Fa"),
            Err(PreviewError::InvalidNumber { .. })
        ));
        assert!(matches!(
            PreviewAddress::from_query("index=1&seq=1&doc=file%3A%2F%2F%2Fa"),
            Err(PreviewError::Ambiguous)
        ));
        assert!(matches!(
            PreviewAddress::from_query("index=1&doc="),
            Err(PreviewError::InvalidDocument(_))
        ));
        assert!(matches!(
            PreviewAddress::parse("file:///a?index=1&doc=file%3A%2F%2F%2Fa"),
            Err(PreviewError::WrongScheme(_))
        ));
        assert!(matches!(PreviewAddress::parse("not a uri"), Err(PreviewError::InvalidUri(_))));
    }

    #[test]
    fn resolve_returns_snapshot_text() {
        let store = store_with("file:///a", &["one", "two"]);
        let uri = PreviewAddress::new("file:///a", 1).to_uri();
        assert_eq!(resolve_preview(&store, &uri).as_ref(), "two");
    }

    #[test]
    fn resolve_degrades_to_empty() {
        let store = store_with("file:///a", &["one"]);

        for uri in [
            PreviewAddress::new("file:///a", 5).to_uri(),
            PreviewAddress::new("file:///other", 0).to_uri(),
            "history://preview?index=x&doc=file%3A%2F%2F%2Fa".to_string(),
            "history://preview".to_string(),
            "garbage".to_string(),
        ] {
            assert_eq!(resolve_preview(&store, &uri).as_ref(), "", "{uri}");
        }
    }

    #[test]
    fn seq_lookup_misses_evicted_snapshots() {
        let store = store_with("file:///a", &["v0", "v1", "v2", "v3"]);

        let evicted = PreviewAddress::at_seq("file:///a", 0).to_uri();
        let retained = PreviewAddress::at_seq("file:///a", 1).to_uri();
        assert_eq!(resolve_preview(&store, &evicted).as_ref(), "");
        assert_eq!(resolve_preview(&store, &retained).as_ref(), "v1");
        // Window index 0 now means seq 1.
        let first = PreviewAddress::new("file:///a", 0).to_uri();
        assert_eq!(resolve_preview(&store, &first).as_ref(), "v1");
    }
}
