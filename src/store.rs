use std::collections::HashMap;

////////////////////////////////////////////////////////////
// Ordered record store
////////////////////////////////////////////////////////////

/// A keyed collection held as a `(key, value)` list sorted ascending by
/// key. The wire format is an unordered map; sorting on every mutation
/// keeps transport iteration order from ever leaking into the view.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedRecords<V> {
    entries: Vec<(String, V)>,
}

// Not derived: the values themselves need no Default for an empty list.
impl<V> Default for OrderedRecords<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> OrderedRecords<V> {
    pub fn new() -> Self {
        Self { entries: vec![] }
    }

    /// Replace the whole collection with the contents of an unordered
    /// map. This is the fetch path; edits never go through here.
    pub fn replace_all(&mut self, map: HashMap<String, V>) {
        self.entries = map.into_iter().collect();
        self.sort();
    }

    /// Insert or replace by key. An existing key keeps the list length
    /// unchanged; a new key grows it by exactly one.
    pub fn upsert(&mut self, key: String, value: V) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self.sort();
    }

    /// Remove by key; absent keys are a no-op.
    pub fn remove_by_key(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, V)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.0.cmp(&b.0));
    }
}

impl<V: Clone> OrderedRecords<V> {
    /// Inverse of `replace_all`: snapshot back to the wire-format map.
    pub fn to_mapping(&self) -> HashMap<String, V> {
        self.entries.iter().cloned().collect()
    }
}
