use std::collections::VecDeque;

use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

/// Number of playback events kept in the feed.
pub const HISTORY_LIMIT: usize = 20;

/// One playback start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub label: String,
    /// Local wall-clock time, `HH:MM:SS`.
    pub time: String,
}

/// Newest-first log of playback starts, capped at [`HISTORY_LIMIT`].
#[derive(Debug, Default)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    pub fn push(&mut self, label: &str, time: String) {
        self.entries.push_front(HistoryEntry {
            label: label.to_string(),
            time,
        });
        self.entries.truncate(HISTORY_LIMIT);
    }

    /// Drop every entry.
    pub fn flush(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn newest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Format a timestamp the way the feed displays it.
pub fn format_clock(at: OffsetDateTime) -> String {
    const CLOCK: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second]");
    at.format(CLOCK).unwrap_or_else(|_| String::from("--:--:--"))
}
