//! Recorder defaults.
//!
//! Centralizes the tuning values; [`RecorderConfig`](crate::RecorderConfig)
//! starts from these and may override them.

use std::time::Duration;

/// Aggregate changed-character volume at or above which an edit batch is
/// captured immediately (paste, large undo, bulk delete).
pub const PASTE_THRESHOLD: usize = 2;

/// Debounce after an edit that inserted a line break.
pub const ENTER_TIMEOUT: Duration = Duration::from_millis(500);

/// Debounce after an ordinary keystroke: capture only after this much idle.
pub const IDLE_TIMEOUT: Duration = Duration::from_millis(2000);

/// Document schemes the recorder captures. Anything else (notably the
/// recorder's own `history:` preview documents) is ignored.
pub const RECORDED_SCHEMES: &[&str] = &["file", "untitled"];

/// Capacity of the async change broadcast. Slow subscribers lag rather than
/// block the recorder.
pub const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Directory name under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "scroller";

/// Config file name within [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "recorder.ron";
