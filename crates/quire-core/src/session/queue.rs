//! Delivery history and the volatile "try again" queue.

use std::collections::HashSet;

/// One delivered-and-graded item.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HistoryEntry {
    item_id: String,
    note_id: String,
}

/// Ordered record of everything graded this session, oldest first.
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
    seen: HashSet<String>,
}

impl SessionHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a graded item.
    pub fn push(&mut self, item_id: impl Into<String>, note_id: impl Into<String>) {
        let item_id = item_id.into();
        self.seen.insert(item_id.clone());
        self.entries.push(HistoryEntry {
            item_id,
            note_id: note_id.into(),
        });
    }

    /// Whether the item was graded at least once.
    pub fn contains(&self, item_id: &str) -> bool {
        self.seen.contains(item_id)
    }

    /// Item ids, oldest first.
    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.item_id.as_str()).collect()
    }

    /// Entries recorded after the last occurrence of `item_id`.
    pub fn deliveries_since(&self, item_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .rposition(|e| e.item_id == item_id)
            .map(|pos| self.entries.len() - pos - 1)
    }

    /// The note shared by the last `run` entries, if they all share one.
    pub fn trailing_note_run(&self, run: usize) -> Option<&str> {
        if run == 0 || self.entries.len() < run {
            return None;
        }
        let tail = &self.entries[self.entries.len() - run..];
        let note = tail[0].note_id.as_str();
        tail.iter().all(|e| e.note_id == note).then_some(note)
    }
}

/// Items graded Again this session, held back until their cooldown elapses.
#[derive(Debug, Clone, Default)]
pub struct VolatileQueue {
    ids: Vec<String>,
}

impl VolatileQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Park an item. Returns false if it was already parked.
    pub fn insert(&mut self, item_id: &str) -> bool {
        if self.contains(item_id) {
            return false;
        }
        self.ids.push(item_id.to_string());
        true
    }

    /// Release an item. Returns false if it was not parked.
    pub fn remove(&mut self, item_id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| id != item_id);
        self.ids.len() != before
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.ids.iter().any(|id| id == item_id)
    }

    /// Parked ids in insertion order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Whether at least `cooldown` other items were graded since `item_id`.
    pub fn is_ready(&self, item_id: &str, history: &SessionHistory, cooldown: usize) -> bool {
        history
            .deliveries_since(item_id)
            .map_or(true, |since| since >= cooldown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(entries: &[(&str, &str)]) -> SessionHistory {
        let mut history = SessionHistory::new();
        for (item, note) in entries {
            history.push(*item, *note);
        }
        history
    }

    #[test]
    fn test_deliveries_since_last_occurrence() {
        let h = history(&[("a", "n1"), ("b", "n2"), ("a", "n1"), ("c", "n3"), ("d", "n4")]);
        assert_eq!(h.deliveries_since("a"), Some(2));
        assert_eq!(h.deliveries_since("d"), Some(0));
        assert_eq!(h.deliveries_since("z"), None);
    }

    #[test]
    fn test_trailing_note_run() {
        let h = history(&[("x", "m"), ("a", "n"), ("b", "n"), ("c", "n")]);
        assert_eq!(h.trailing_note_run(3), Some("n"));
        assert_eq!(h.trailing_note_run(4), None);
        assert_eq!(h.trailing_note_run(0), None);
        assert_eq!(history(&[("a", "n")]).trailing_note_run(3), None);
    }

    #[test]
    fn test_queue_has_no_duplicates() {
        let mut queue = VolatileQueue::new();
        assert!(queue.insert("a"));
        assert!(!queue.insert("a"));
        assert_eq!(queue.ids(), ["a".to_string()]);
        assert!(queue.remove("a"));
        assert!(!queue.remove("a"));
        assert!(queue.ids().is_empty());
    }

    #[test]
    fn test_cooldown_counts_history_after_item() {
        let queue = VolatileQueue::new();
        let mut h = history(&[("a", "n")]);
        for (i, filler) in ["b", "c", "d", "e"].iter().enumerate() {
            h.push(*filler, format!("f{}", i));
            assert!(!queue.is_ready("a", &h, 5));
        }
        h.push("f", "f9");
        assert!(queue.is_ready("a", &h, 5));
    }
}
