use std::fs::{read_dir, File};
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{from_reader, to_writer_pretty};

use crate::entry::{Entry, EntryId, NewEntry, RuleId, UserId};
use crate::schedule::{RuleFields, ScheduleRule};
use crate::store::{EntryStore, RuleStore, StoreError};

const ENTRIES_PREFIX: &str = "entries-";
const RULES_PREFIX: &str = "rules-";

/// File-backed stores: a directory holding one JSON file per owner and
/// collection (`entries-<owner>.json`, `rules-<owner>.json`). Every
/// operation reads the file fresh and writes it back whole.
#[derive(Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    pub fn new(root: PathBuf) -> Vault {
        return Vault { root };
    }

    fn collection_path(&self, prefix: &str, owner: &UserId) -> PathBuf {
        return self.root.join(format!("{}{}.json", prefix, owner));
    }

    fn read_collection<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>, StoreError> {
        if !path.exists() {
            return Ok(vec![]);
        }
        let file = File::open(path)
            .map_err(|why| StoreError(format!("Could not read {}: {}", path.display(), why)))?;
        return from_reader(file)
            .map_err(|why| StoreError(format!("Could not parse {}: {}", path.display(), why)));
    }

    fn write_collection<T: Serialize>(&self, path: &Path, values: &[T]) -> Result<(), StoreError> {
        let file = File::create(path)
            .map_err(|why| StoreError(format!("Could not write {}: {}", path.display(), why)))?;
        return to_writer_pretty(file, values)
            .map_err(|why| StoreError(format!("Could not write {}: {}", path.display(), why)));
    }

    /// The paths of every owner's file for one collection prefix.
    /// update/delete are keyed by id alone, so they scan all owners.
    fn collection_paths(&self, prefix: &str) -> Result<Vec<PathBuf>, StoreError> {
        let reader = read_dir(&self.root)
            .map_err(|why| StoreError(format!("Could not read the vault directory: {}", why)))?;

        let mut paths = Vec::new();
        for maybe_dir_entry in reader {
            let dir_entry = maybe_dir_entry
                .map_err(|why| StoreError(format!("Could not read a vault file: {}", why)))?;
            let name = dir_entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with(prefix) && name.ends_with(".json") {
                paths.push(dir_entry.path());
            }
        }
        return Ok(paths);
    }
}

fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    return format!("{:016x}{:016x}", rng.gen::<u64>(), rng.gen::<u64>());
}

impl EntryStore for Vault {
    fn list(&self, owner: &UserId) -> Result<Vec<Entry>, StoreError> {
        return self.read_collection(&self.collection_path(ENTRIES_PREFIX, owner));
    }

    fn create(&mut self, owner: &UserId, entry: NewEntry) -> Result<Entry, StoreError> {
        let path = self.collection_path(ENTRIES_PREFIX, owner);
        let mut entries: Vec<Entry> = self.read_collection(&path)?;
        let entry = Entry {
            id: generate_id(),
            date: entry.date,
            amount: entry.amount,
            description: entry.description,
            kind: entry.kind,
            rule_id: entry.rule_id,
        };
        entries.push(entry.clone());
        self.write_collection(&path, &entries)?;
        return Ok(entry);
    }

    fn update(&mut self, id: &EntryId, fields: NewEntry) -> Result<Entry, StoreError> {
        for path in self.collection_paths(ENTRIES_PREFIX)? {
            let mut entries: Vec<Entry> = self.read_collection(&path)?;
            let Some(entry) = entries.iter_mut().find(|entry| &entry.id == id) else {
                continue;
            };
            entry.date = fields.date;
            entry.amount = fields.amount;
            entry.description = fields.description;
            entry.kind = fields.kind;
            entry.rule_id = fields.rule_id;
            let updated = entry.clone();
            self.write_collection(&path, &entries)?;
            return Ok(updated);
        }
        return Err(StoreError(format!("No entry with id {}", id)));
    }

    fn delete(&mut self, id: &EntryId) -> Result<(), StoreError> {
        for path in self.collection_paths(ENTRIES_PREFIX)? {
            let mut entries: Vec<Entry> = self.read_collection(&path)?;
            let Some(position) = entries.iter().position(|entry| &entry.id == id) else {
                continue;
            };
            entries.remove(position);
            self.write_collection(&path, &entries)?;
            return Ok(());
        }
        return Err(StoreError(format!("No entry with id {}", id)));
    }
}

impl RuleStore for Vault {
    fn list(&self, owner: &UserId) -> Result<Vec<ScheduleRule>, StoreError> {
        return self.read_collection(&self.collection_path(RULES_PREFIX, owner));
    }

    fn create(&mut self, owner: &UserId, fields: RuleFields) -> Result<ScheduleRule, StoreError> {
        let path = self.collection_path(RULES_PREFIX, owner);
        let mut rules: Vec<ScheduleRule> = self.read_collection(&path)?;
        let rule = fields.with_id(generate_id());
        rules.push(rule.clone());
        self.write_collection(&path, &rules)?;
        return Ok(rule);
    }

    fn update(&mut self, id: &RuleId, fields: RuleFields) -> Result<ScheduleRule, StoreError> {
        for path in self.collection_paths(RULES_PREFIX)? {
            let mut rules: Vec<ScheduleRule> = self.read_collection(&path)?;
            let Some(position) = rules.iter().position(|rule| &rule.id == id) else {
                continue;
            };
            rules[position] = fields.with_id(id.clone());
            let updated = rules[position].clone();
            self.write_collection(&path, &rules)?;
            return Ok(updated);
        }
        return Err(StoreError(format!("No rule with id {}", id)));
    }

    fn delete(&mut self, id: &RuleId) -> Result<(), StoreError> {
        for path in self.collection_paths(RULES_PREFIX)? {
            let mut rules: Vec<ScheduleRule> = self.read_collection(&path)?;
            let Some(position) = rules.iter().position(|rule| &rule.id == id) else {
                continue;
            };
            rules.remove(position);
            self.write_collection(&path, &rules)?;
            return Ok(());
        }
        return Err(StoreError(format!("No rule with id {}", id)));
    }
}
