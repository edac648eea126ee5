use std::collections::HashMap;

#[cfg(test)]
use mockall::automock;

use crate::entry::{Entry, EntryId, NewEntry, RuleId, UserId};
use crate::schedule::{RuleFields, ScheduleRule};

/// A failed create/update/delete against a collaborator store.
/// Recoverable and reportable, never fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError(pub String);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "Store failure: {}", self.0);
    }
}

#[cfg_attr(test, automock)]
pub trait EntryStore {
    fn list(&self, owner: &UserId) -> Result<Vec<Entry>, StoreError>;
    fn create(&mut self, owner: &UserId, entry: NewEntry) -> Result<Entry, StoreError>;
    fn update(&mut self, id: &EntryId, fields: NewEntry) -> Result<Entry, StoreError>;
    fn delete(&mut self, id: &EntryId) -> Result<(), StoreError>;
}

#[cfg_attr(test, automock)]
pub trait RuleStore {
    fn list(&self, owner: &UserId) -> Result<Vec<ScheduleRule>, StoreError>;
    fn create(&mut self, owner: &UserId, fields: RuleFields) -> Result<ScheduleRule, StoreError>;
    fn update(&mut self, id: &RuleId, fields: RuleFields) -> Result<ScheduleRule, StoreError>;
    fn delete(&mut self, id: &RuleId) -> Result<(), StoreError>;
}

/// Entry store over plain in-memory collections.
#[derive(Default)]
pub struct MemoryEntryStore {
    entries: HashMap<UserId, Vec<Entry>>,
    counter: u64,
}

impl MemoryEntryStore {
    pub fn new() -> MemoryEntryStore {
        return MemoryEntryStore::default();
    }
}

impl EntryStore for MemoryEntryStore {
    fn list(&self, owner: &UserId) -> Result<Vec<Entry>, StoreError> {
        return Ok(self.entries.get(owner).cloned().unwrap_or_default());
    }

    fn create(&mut self, owner: &UserId, entry: NewEntry) -> Result<Entry, StoreError> {
        self.counter += 1;
        let entry = Entry {
            id: format!("entry-{}", self.counter),
            date: entry.date,
            amount: entry.amount,
            description: entry.description,
            kind: entry.kind,
            rule_id: entry.rule_id,
        };
        self.entries
            .entry(owner.clone())
            .or_default()
            .push(entry.clone());
        return Ok(entry);
    }

    fn update(&mut self, id: &EntryId, fields: NewEntry) -> Result<Entry, StoreError> {
        for entries in self.entries.values_mut() {
            if let Some(entry) = entries.iter_mut().find(|entry| &entry.id == id) {
                entry.date = fields.date;
                entry.amount = fields.amount;
                entry.description = fields.description;
                entry.kind = fields.kind;
                entry.rule_id = fields.rule_id;
                return Ok(entry.clone());
            }
        }
        return Err(StoreError(format!("No entry with id {}", id)));
    }

    fn delete(&mut self, id: &EntryId) -> Result<(), StoreError> {
        for entries in self.entries.values_mut() {
            if let Some(position) = entries.iter().position(|entry| &entry.id == id) {
                entries.remove(position);
                return Ok(());
            }
        }
        return Err(StoreError(format!("No entry with id {}", id)));
    }
}

/// Rule store over plain in-memory collections.
#[derive(Default)]
pub struct MemoryRuleStore {
    rules: HashMap<UserId, Vec<ScheduleRule>>,
    counter: u64,
}

impl MemoryRuleStore {
    pub fn new() -> MemoryRuleStore {
        return MemoryRuleStore::default();
    }
}

impl RuleStore for MemoryRuleStore {
    fn list(&self, owner: &UserId) -> Result<Vec<ScheduleRule>, StoreError> {
        return Ok(self.rules.get(owner).cloned().unwrap_or_default());
    }

    fn create(&mut self, owner: &UserId, fields: RuleFields) -> Result<ScheduleRule, StoreError> {
        self.counter += 1;
        let rule = fields.with_id(format!("rule-{}", self.counter));
        self.rules
            .entry(owner.clone())
            .or_default()
            .push(rule.clone());
        return Ok(rule);
    }

    fn update(&mut self, id: &RuleId, fields: RuleFields) -> Result<ScheduleRule, StoreError> {
        for rules in self.rules.values_mut() {
            if let Some(rule) = rules.iter_mut().find(|rule| &rule.id == id) {
                *rule = fields.with_id(id.clone());
                return Ok(rule.clone());
            }
        }
        return Err(StoreError(format!("No rule with id {}", id)));
    }

    fn delete(&mut self, id: &RuleId) -> Result<(), StoreError> {
        for rules in self.rules.values_mut() {
            if let Some(position) = rules.iter().position(|rule| &rule.id == id) {
                rules.remove(position);
                return Ok(());
            }
        }
        return Err(StoreError(format!("No rule with id {}", id)));
    }
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests_memory_stores {
    use super::{EntryStore, MemoryEntryStore, StoreError};
    use crate::entry::{EntryKind, NewEntry};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn owner() -> String {
        return "user-1".to_string();
    }

    fn new_entry(day: u32) -> NewEntry {
        return NewEntry {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            amount: dec!(50),
            description: "Groceries".to_string(),
            kind: EntryKind::Expense,
            rule_id: None,
        };
    }

    #[test]
    fn list__empty_for_unknown_owner() {
        let store = MemoryEntryStore::new();
        assert_eq!(store.list(&owner()).unwrap(), vec![]);
    }

    #[test]
    fn create_then_list() {
        let mut store = MemoryEntryStore::new();
        let created = store.create(&owner(), new_entry(5)).unwrap();
        assert_eq!(store.list(&owner()).unwrap(), vec![created]);
    }

    #[test]
    fn create__assigns_distinct_ids() {
        let mut store = MemoryEntryStore::new();
        let first = store.create(&owner(), new_entry(5)).unwrap();
        let second = store.create(&owner(), new_entry(6)).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn create__owners_are_isolated() {
        let mut store = MemoryEntryStore::new();
        store.create(&owner(), new_entry(5)).unwrap();
        assert_eq!(store.list(&"user-2".to_string()).unwrap(), vec![]);
    }

    #[test]
    fn update__overwrites_every_field() {
        let mut store = MemoryEntryStore::new();
        let created = store.create(&owner(), new_entry(5)).unwrap();

        let mut fields = new_entry(9);
        fields.amount = dec!(75);
        let updated = store.update(&created.id, fields).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.amount, dec!(75));
        assert_eq!(store.list(&owner()).unwrap(), vec![updated]);
    }

    #[test]
    fn update__unknown_id() {
        let mut store = MemoryEntryStore::new();
        assert_eq!(
            store.update(&"missing".to_string(), new_entry(5)),
            Err(StoreError("No entry with id missing".to_string()))
        );
    }

    #[test]
    fn delete__removes_only_the_target() {
        let mut store = MemoryEntryStore::new();
        let first = store.create(&owner(), new_entry(5)).unwrap();
        let second = store.create(&owner(), new_entry(6)).unwrap();

        store.delete(&first.id).unwrap();
        assert_eq!(store.list(&owner()).unwrap(), vec![second]);
    }

    #[test]
    fn delete__unknown_id() {
        let mut store = MemoryEntryStore::new();
        assert_eq!(
            store.delete(&"missing".to_string()),
            Err(StoreError("No entry with id missing".to_string()))
        );
    }
}
