use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::studio::types::{ActiveView, ArtifactSet, ImageId, Settings};

/// One captured pre-mutation state. Undo restores these fields wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub artifacts: IndexMap<ImageId, ArtifactSet>,
    pub active_view: ActiveView,
    pub settings: Settings,
    pub filter_selection: Option<String>,
}

/// Bounded undo stack. Pushing past the limit evicts the oldest entry
/// first; undo pops the most recent entry. There is no redo.
#[derive(Debug, Clone)]
pub struct HistorySnapshotter {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl HistorySnapshotter {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() == self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Pops the most recent snapshot. `None` means nothing to undo; that is
    /// a no-op for the caller, not an error.
    pub fn undo(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(marker: &str) -> HistoryEntry {
        HistoryEntry {
            artifacts: IndexMap::new(),
            active_view: ActiveView::Original,
            settings: Settings {
                theme: marker.to_string(),
                ..Settings::default()
            },
            filter_selection: None,
        }
    }

    #[test]
    fn test_undo_returns_most_recent_first() {
        let mut history = HistorySnapshotter::new(20);
        history.push(entry("first"));
        history.push(entry("second"));

        assert_eq!(history.undo().unwrap().settings.theme, "second");
        assert_eq!(history.undo().unwrap().settings.theme, "first");
        assert!(history.undo().is_none());
    }

    #[test]
    fn test_overflow_evicts_the_oldest_entry() {
        let mut history = HistorySnapshotter::new(20);
        for index in 0..25 {
            history.push(entry(&format!("entry-{index}")));
        }
        assert_eq!(history.len(), 20);

        // Drain: the newest comes out first, entries 0..5 are gone.
        let mut drained = Vec::new();
        while let Some(popped) = history.undo() {
            drained.push(popped.settings.theme);
        }
        assert_eq!(drained.len(), 20);
        assert_eq!(drained.first().map(String::as_str), Some("entry-24"));
        assert_eq!(drained.last().map(String::as_str), Some("entry-5"));
    }

    #[test]
    fn test_undo_on_empty_stack_is_a_no_op() {
        let mut history = HistorySnapshotter::new(20);
        assert!(history.is_empty());
        assert!(history.undo().is_none());
        assert!(history.undo().is_none());
    }
}
