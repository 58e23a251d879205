//! Trigger classification of edit batches.
//!
//! Decides from one batch of deltas how urgently the document is worth
//! capturing. There is no paste event in editor APIs, so "paste-like" is
//! inferred from volume: anything that moves two or more characters at once
//! (paste, multi-char undo, selection delete) is captured immediately.

use strum::IntoStaticStr;

use scroller_types::TextDelta;

use crate::RecorderConfig;

/// How an edit batch should be captured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Trigger {
    /// Nothing changed: neither schedule nor capture.
    NoOp,
    /// Capture now, bypassing the debounce.
    LargeChange,
    /// A line break was typed: short debounce.
    NewlineBoundary,
    /// Ordinary typing: long idle debounce.
    OrdinaryEdit,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified batch, with the measurements that produced the verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub trigger: Trigger,
    /// `Σ |inserted − replaced|` over the batch.
    pub chars_changed: usize,
    /// Any inserted text contains a line break.
    pub has_newline: bool,
}

/// Classify one edit batch against `paste_threshold`.
pub fn classify(deltas: &[TextDelta], paste_threshold: usize) -> Classification {
    let chars_changed = deltas.iter().map(TextDelta::volume).sum();
    let has_newline = deltas.iter().any(TextDelta::has_newline);
    let touched = deltas
        .iter()
        .any(|d| d.range_length > 0 || !d.text.is_empty());

    let trigger = if !touched {
        Trigger::NoOp
    } else if chars_changed >= paste_threshold {
        Trigger::LargeChange
    } else if has_newline {
        Trigger::NewlineBoundary
    } else {
        Trigger::OrdinaryEdit
    };

    Classification {
        trigger,
        chars_changed,
        has_newline,
    }
}

/// [`classify`] bound to a configured threshold.
#[derive(Clone, Copy, Debug)]
pub struct TriggerClassifier {
    paste_threshold: usize,
}

impl TriggerClassifier {
    pub fn new(paste_threshold: usize) -> Self {
        Self { paste_threshold }
    }

    pub fn from_config(config: &RecorderConfig) -> Self {
        Self::new(config.paste_threshold)
    }

    pub fn classify(&self, deltas: &[TextDelta]) -> Classification {
        classify(deltas, self.paste_threshold)
    }
}

impl Default for TriggerClassifier {
    fn default() -> Self {
        Self::new(crate::constants::PASTE_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger(deltas: &[TextDelta]) -> Trigger {
        TriggerClassifier::default().classify(deltas).trigger
    }

    #[test]
    fn empty_batch_is_noop() {
        assert_eq!(trigger(&[]), Trigger::NoOp);
        assert_eq!(trigger(&[TextDelta::new(0, "")]), Trigger::NoOp);
    }

    #[test]
    fn single_keystroke_is_ordinary() {
        assert_eq!(trigger(&[TextDelta::insert("b")]), Trigger::OrdinaryEdit);
        assert_eq!(trigger(&[TextDelta::delete(1)]), Trigger::OrdinaryEdit);
        // Overtyping a selected char with another char.
        assert_eq!(trigger(&[TextDelta::new(1, "x")]), Trigger::OrdinaryEdit);
    }

    #[test]
    fn bulk_changes_are_large() {
        let c = TriggerClassifier::default().classify(&[TextDelta::insert("xyz")]);
        assert_eq!(c.trigger, Trigger::LargeChange);
        assert_eq!(c.chars_changed, 3);

        assert_eq!(trigger(&[TextDelta::delete(2)]), Trigger::LargeChange);
        assert_eq!(trigger(&[TextDelta::delete(40)]), Trigger::LargeChange);
    }

    #[test]
    fn volume_sums_across_deltas() {
        // Multi-cursor typing: two single-char inserts in one batch.
        let c = TriggerClassifier::default()
            .classify(&[TextDelta::insert("a"), TextDelta::insert("a")]);
        assert_eq!(c.chars_changed, 2);
        assert_eq!(c.trigger, Trigger::LargeChange);
    }

    #[test]
    fn newline_is_short_boundary() {
        let c = TriggerClassifier::default().classify(&[TextDelta::insert("\n")]);
        assert_eq!(c.trigger, Trigger::NewlineBoundary);
        assert!(c.has_newline);
    }

    #[test]
    fn large_change_wins_over_newline() {
        // Enter with auto-indent inserts a newline plus indentation.
        assert_eq!(trigger(&[TextDelta::insert("\n    ")]), Trigger::LargeChange);
        assert_eq!(trigger(&[TextDelta::insert("\r\n")]), Trigger::LargeChange);
    }

    #[test]
    fn equal_length_replacement_is_not_large() {
        // Replacing "foo" with "bar" has zero net volume.
        let c = TriggerClassifier::default().classify(&[TextDelta::new(3, "bar")]);
        assert_eq!(c.chars_changed, 0);
        assert_eq!(c.trigger, Trigger::OrdinaryEdit);
    }

    #[test]
    fn threshold_is_configurable() {
        let lenient = TriggerClassifier::new(10);
        assert_eq!(
            lenient.classify(&[TextDelta::insert("xyz")]).trigger,
            Trigger::OrdinaryEdit
        );
        assert_eq!(
            lenient.classify(&[TextDelta::insert("0123456789")]).trigger,
            Trigger::LargeChange
        );
    }

    #[test]
    fn trigger_names() {
        assert_eq!(Trigger::LargeChange.to_string(), "large_change");
        assert_eq!(Trigger::NewlineBoundary.as_str(), "newline_boundary");
    }
}
