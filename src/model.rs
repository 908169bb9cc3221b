use std::collections::HashMap;

use crate::store::OrderedRecords;
use crate::types::Listener;

////////////////////////////////////////////////////////////
// Config view model
////////////////////////////////////////////////////////////

/// Editable client-side copy of the server configuration. Two distinct
/// write paths, never mixed: `set_*` replaces a collection wholesale
/// from a fetch, the edit methods mutate single entries in place. A
/// fetch result is never merged into an in-progress edit.
#[derive(Debug, Clone, Default)]
pub struct ConfigModel {
    pub dns: OrderedRecords<String>,
    pub listeners: OrderedRecords<Listener>,
}

impl ConfigModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_dns(&mut self, map: HashMap<String, String>) {
        self.dns.replace_all(map);
    }

    pub fn set_listeners(&mut self, map: HashMap<String, Listener>) {
        self.listeners.replace_all(map);
    }

    /// Upsert a DNS override. Both sides are trimmed; an empty `from`
    /// is rejected silently. An empty `to` deletes the record: blank
    /// target means "remove this override", not a validation error.
    pub fn replace_dns(&mut self, from: &str, to: &str) {
        let from = from.trim();
        let to = to.trim();

        if from.is_empty() {
            return;
        }

        if to.is_empty() {
            self.dns.remove_by_key(from);
        } else {
            self.dns.upsert(from.to_string(), to.to_string());
        }
    }

    /// Add a new listener. Empty name, empty bind, or a name collision
    /// all leave the list untouched; the caller's form keeps its state
    /// and nothing is raised. Names are immutable once inserted, so a
    /// rename is delete plus recreate.
    pub fn add_listener(&mut self, name: &str, listener: Listener) {
        let name = name.trim();
        if name.is_empty() || listener.bind.trim().is_empty() {
            return;
        }
        if self.listeners.contains_key(name) {
            log::debug!("listener {} already exists, not added", name);
            return;
        }

        self.listeners.upsert(name.to_string(), listener);
    }

    pub fn remove_listener(&mut self, name: &str) {
        self.listeners.remove_by_key(name);
    }

    /// Wire-format snapshot for a DNS save.
    pub fn dns_mapping(&self) -> HashMap<String, String> {
        self.dns.to_mapping()
    }

    /// Wire-format snapshot for a listener save.
    pub fn listener_mapping(&self) -> HashMap<String, Listener> {
        self.listeners.to_mapping()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_dns_trims_both_sides() {
        let mut model = ConfigModel::new();
        model.replace_dns("foo", " bar ");

        assert_eq!(model.dns.get("foo"), Some(&"bar".to_string()));
    }

    #[test]
    fn test_replace_dns_blank_target_deletes() {
        let mut model = ConfigModel::new();
        model.replace_dns("foo", "bar");
        model.replace_dns("foo", "");

        assert!(!model.dns.contains_key("foo"));
        assert!(model.dns.is_empty());
    }

    #[test]
    fn test_replace_dns_empty_from_is_noop() {
        let mut model = ConfigModel::new();
        model.replace_dns("  ", "bar");

        assert!(model.dns.is_empty());
    }

    #[test]
    fn test_add_listener_rejects_duplicate_name() {
        let mut model = ConfigModel::new();
        model.add_listener("l1", Listener::new("0.0.0.0:443".to_string(), 8443));
        model.add_listener("l1", Listener::new("127.0.0.1:80".to_string(), 8080));

        assert_eq!(model.listeners.len(), 1);
        assert_eq!(model.listeners.get("l1").unwrap().bind, "0.0.0.0:443");
    }

    #[test]
    fn test_add_listener_rejects_empty_name_or_bind() {
        let mut model = ConfigModel::new();
        model.add_listener("", Listener::new("0.0.0.0:443".to_string(), 8443));
        model.add_listener("l1", Listener::new("  ".to_string(), 8443));

        assert!(model.listeners.is_empty());
    }

    #[test]
    fn test_set_dns_replaces_wholesale() {
        let mut model = ConfigModel::new();
        model.replace_dns("local-edit", "1.2.3.4");

        model.set_dns(HashMap::from([(
            "fetched".to_string(),
            "5.6.7.8".to_string(),
        )]));

        assert!(!model.dns.contains_key("local-edit"));
        assert_eq!(model.dns.get("fetched"), Some(&"5.6.7.8".to_string()));
    }

    #[test]
    fn test_mappings_round_trip() {
        let mut model = ConfigModel::new();
        model.replace_dns("a", "1");
        model.replace_dns("b", "2");
        model.add_listener("l1", Listener::new("0.0.0.0:443".to_string(), 8443));

        assert_eq!(model.dns_mapping().len(), 2);
        assert_eq!(model.listener_mapping().len(), 1);
    }
}
