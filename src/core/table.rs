// BugSleuth - core/table.rs
//
// Insertion-ordered string-keyed table.
// Report numbering is derived from first-seen order, so iteration order
// must be stable and independent of hashing or counts.

use std::collections::HashMap;

/// A `String -> V` map that iterates in first-insertion order.
///
/// Keys are never removed, so the position of a key is fixed once it is
/// inserted and `position + 1` is its first-seen ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedTable<V> {
    slots: HashMap<String, usize>,
    entries: Vec<(String, V)>,
}

impl<V> OrderedTable<V> {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.slots.get(key).map(|&i| &self.entries[i].1)
    }

    /// 1-based first-seen ordinal of `key`.
    pub fn ordinal(&self, key: &str) -> Option<usize> {
        self.slots.get(key).map(|&i| i + 1)
    }

    /// Mutable access to the value for `key`, inserting `make(ordinal)` first
    /// if the key is new. `ordinal` is the 1-based position the key takes.
    pub fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce(usize) -> V) -> &mut V {
        let slot = match self.slots.get(key).copied() {
            Some(i) => i,
            None => {
                let i = self.entries.len();
                self.entries.push((key.to_string(), make(i + 1)));
                self.slots.insert(key.to_string(), i);
                i
            }
        };
        &mut self.entries[slot].1
    }

    /// Entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<V> Default for OrderedTable<V> {
    fn default() -> Self {
        Self::new()
    }
}
