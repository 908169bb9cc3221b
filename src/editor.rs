use crate::store::OrderedRecords;
use crate::types::Listener;

////////////////////////////////////////////////////////////
// Listener rule editor
////////////////////////////////////////////////////////////

/// Which of a listener's rule lists an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleList {
    StaticHosts,
    Patterns,
}

fn select_list<'a>(listener: &'a mut Listener, list: RuleList) -> &'a mut Vec<String> {
    match list {
        RuleList::StaticHosts => &mut listener.rules.static_hosts,
        RuleList::Patterns => &mut listener.rules.patterns,
    }
}

/// Append a rule entry to the named listener. The value is trimmed;
/// empty values and values already present are silent no-ops. A missing
/// listener is also a no-op: an edit racing a delete is tolerated, not
/// an error.
pub fn add_entry(listeners: &mut OrderedRecords<Listener>, name: &str, list: RuleList, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }

    let Some(listener) = listeners.get_mut(name) else {
        return;
    };

    let entries = select_list(listener, list);
    if !entries.iter().any(|e| e == value) {
        entries.push(value.to_string());
    }
}

/// Rewrite every occurrence of `old` in the named list. A new value
/// that trims to empty degenerates to removal; otherwise entries not
/// equal to `old` keep their position and content.
pub fn edit_entry(
    listeners: &mut OrderedRecords<Listener>,
    name: &str,
    list: RuleList,
    old: &str,
    new_raw: &str,
) {
    let new_value = new_raw.trim();
    if new_value.is_empty() {
        remove_entry(listeners, name, list, old);
        return;
    }

    let Some(listener) = listeners.get_mut(name) else {
        return;
    };

    let entries = select_list(listener, list);
    for entry in entries.iter_mut() {
        if entry == old {
            *entry = new_value.to_string();
        }
    }
}

/// Drop a rule entry from the named list; idempotent.
pub fn remove_entry(
    listeners: &mut OrderedRecords<Listener>,
    name: &str,
    list: RuleList,
    value: &str,
) {
    let Some(listener) = listeners.get_mut(name) else {
        return;
    };

    select_list(listener, list).retain(|e| e != value);
}
