//! Bounded, deduplicating history of past rule sets

use tracing::{debug, trace};

use crate::store::ConfigStore;

use super::serialize::pretty_print;

/// Default and minimum capacity for the history stack.
const DEFAULT_HISTORY_MAX: usize = 10;

/// Most-recently-used stack of serialized rule sets, unique by content.
///
/// Mirrored to `filters/history{i}` store slots on every change so a recall
/// menu survives restarts. Push happens on committed mutations only, so the
/// stack records discrete filter states, not keystrokes.
#[derive(Debug)]
pub struct HistoryStack {
    entries: Vec<String>,
    capacity: usize,
}

impl HistoryStack {
    /// Load the stack from the store. Reading stops at the first empty slot.
    pub fn load(store: &dyn ConfigStore) -> Self {
        let capacity = store
            .get_int("filters/history_max")
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(DEFAULT_HISTORY_MAX)
            .max(1);

        let mut entries = Vec::new();
        for i in 0..capacity {
            match store.get_string(&format!("filters/history{}", i)) {
                Some(line) if !line.is_empty() => entries.push(line),
                _ => break,
            }
        }

        trace!("loaded {} history entries (capacity {})", entries.len(), capacity);
        Self { entries, capacity }
    }

    #[cfg(test)]
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a new state. No-op when it matches the current top entry.
    ///
    /// Any older occurrence of the same state is removed first (the
    /// remaining entries keep their relative order), then the state is
    /// inserted at the front and the stack truncated to capacity.
    pub fn push(&mut self, serialized: &str, store: &mut dyn ConfigStore) {
        if self.entries.first().is_some_and(|top| top == serialized) {
            return;
        }

        self.entries.retain(|e| e != serialized);
        self.entries.insert(0, serialized.to_string());
        self.entries.truncate(self.capacity);

        self.save(store);
        debug!("history now holds {} entries", self.entries.len());
    }

    /// Fetch an entry; out-of-range returns `None`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Entries with their display summaries, most recent first.
    pub fn list(&self) -> Vec<(usize, String)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, pretty_print(e)))
            .collect()
    }

    fn save(&self, store: &mut dyn ConfigStore) {
        for i in 0..self.capacity {
            let line = self.entries.get(i).map(String::as_str).unwrap_or("");
            store.set_string(&format!("filters/history{}", i), line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_push_and_order() {
        let mut store = MemoryStore::new();
        let mut history = HistoryStack::with_capacity(10);

        history.push("A", &mut store);
        history.push("B", &mut store);
        assert_eq!(history.get(0), Some("B"));
        assert_eq!(history.get(1), Some("A"));
    }

    #[test]
    fn test_repeat_of_top_is_noop() {
        let mut store = MemoryStore::new();
        let mut history = HistoryStack::with_capacity(10);

        history.push("A", &mut store);
        history.push("A", &mut store);
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(0), Some("A"));
    }

    #[test]
    fn test_dedup_moves_to_front() {
        let mut store = MemoryStore::new();
        let mut history = HistoryStack::with_capacity(10);

        history.push("A", &mut store);
        history.push("B", &mut store);
        history.push("A", &mut store);

        assert_eq!(history.len(), 2);
        assert_eq!(history.get(0), Some("A"));
        assert_eq!(history.get(1), Some("B"));
    }

    #[test]
    fn test_dedup_preserves_relative_order() {
        let mut store = MemoryStore::new();
        let mut history = HistoryStack::with_capacity(10);

        for s in ["A", "B", "C", "D", "B"] {
            history.push(s, &mut store);
        }
        assert_eq!(history.get(0), Some("B"));
        assert_eq!(history.get(1), Some("D"));
        assert_eq!(history.get(2), Some("C"));
        assert_eq!(history.get(3), Some("A"));
    }

    #[test]
    fn test_capacity_eviction() {
        let mut store = MemoryStore::new();
        let mut history = HistoryStack::with_capacity(3);

        for s in ["A", "B", "C", "D"] {
            history.push(s, &mut store);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.get(0), Some("D"));
        assert_eq!(history.get(1), Some("C"));
        assert_eq!(history.get(2), Some("B"));
        assert_eq!(history.get(3), None);
    }

    #[test]
    fn test_persisted_slots() {
        let mut store = MemoryStore::new();
        let mut history = HistoryStack::with_capacity(3);

        history.push("A", &mut store);
        history.push("B", &mut store);

        assert_eq!(store.get_string("filters/history0"), Some("B".to_string()));
        assert_eq!(store.get_string("filters/history1"), Some("A".to_string()));
        // unused slots are blanked
        assert_eq!(store.get_string("filters/history2"), Some(String::new()));
    }

    #[test]
    fn test_load_stops_at_first_empty_slot() {
        let mut store = MemoryStore::new();
        store.set_int("filters/history_max", 5);
        store.set_string("filters/history0", "A");
        store.set_string("filters/history1", "");
        store.set_string("filters/history2", "B");

        let history = HistoryStack::load(&store);
        assert_eq!(history.len(), 1);
        assert_eq!(history.capacity(), 5);
    }

    #[test]
    fn test_default_capacity_when_unset() {
        let store = MemoryStore::new();
        let history = HistoryStack::load(&store);
        assert_eq!(history.capacity(), 10);
    }
}
