use crate::entry::{tagged_description, Entry, NewEntry, RuleId, UserId};
use crate::schedule::generator::candidate_dates;
use crate::schedule::window::{processing_window, DateWindow};
use crate::schedule::{RuleFields, ScheduleRule, ValidationError};
use crate::store::{EntryStore, RuleStore, StoreError};

/// The outcome of one reconciliation pass. Individual store operations
/// are independent; a failed one never rolls back the others, so the
/// report can describe partial progress.
#[derive(Debug, Default, PartialEq)]
pub struct MaterializeReport {
    /// How many creates were issued.
    pub attempted_creates: usize,
    /// How many deletes of previously generated entries were issued.
    pub attempted_deletes: usize,
    pub created: Vec<Entry>,
    pub deleted: usize,
    pub failures: Vec<StoreError>,
}

impl MaterializeReport {
    pub fn attempted(&self) -> usize {
        return self.attempted_creates + self.attempted_deletes;
    }

    pub fn is_clean(&self) -> bool {
        return self.failures.is_empty();
    }

    pub fn all_failed(&self) -> bool {
        return self.attempted() > 0 && self.failures.len() == self.attempted();
    }

    fn merge(&mut self, other: MaterializeReport) {
        self.attempted_creates += other.attempted_creates;
        self.attempted_deletes += other.attempted_deletes;
        self.created.extend(other.created);
        self.deleted += other.deleted;
        self.failures.extend(other.failures);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterializeError {
    Validation(ValidationError),
    Store(StoreError),
}

impl From<ValidationError> for MaterializeError {
    fn from(error: ValidationError) -> MaterializeError {
        return MaterializeError::Validation(error);
    }
}

impl From<StoreError> for MaterializeError {
    fn from(error: StoreError) -> MaterializeError {
        return MaterializeError::Store(error);
    }
}

impl std::fmt::Display for MaterializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return match self {
            MaterializeError::Validation(error) => write!(f, "{}", error),
            MaterializeError::Store(error) => write!(f, "{}", error),
        };
    }
}

/// Reconciles schedule rules against the entry store: generates the
/// occurrences a rule calls for within a query window, creating only
/// the ones that are not stored yet.
///
/// The duplicate check is a read-then-create, so the no-duplicate
/// invariant assumes a single writer per owner; generation is expected
/// to be triggered sequentially by one user's session.
pub struct Materializer<E: EntryStore, R: RuleStore> {
    pub entries: E,
    pub rules: R,
}

impl<E: EntryStore, R: RuleStore> Materializer<E, R> {
    pub fn new(entries: E, rules: R) -> Materializer<E, R> {
        return Materializer { entries, rules };
    }

    /// Materializes every active rule over the query window. Running
    /// this twice over the same window creates nothing the second
    /// time.
    pub fn generate(
        &mut self,
        owner: &UserId,
        window: &DateWindow,
    ) -> Result<MaterializeReport, StoreError> {
        let rules = self.rules.list(owner)?;
        let mut report = MaterializeReport::default();
        for rule in &rules {
            report.merge(self.generate_for_rule(owner, rule, window)?);
        }
        return Ok(report);
    }

    /// Validates and persists a new rule, then materializes it right
    /// away so it is visible without a second pass.
    pub fn create_rule(
        &mut self,
        owner: &UserId,
        fields: RuleFields,
        window: &DateWindow,
    ) -> Result<(ScheduleRule, MaterializeReport), MaterializeError> {
        fields.validate()?;
        let rule = self.rules.create(owner, fields)?;
        let report = self.generate_for_rule(owner, &rule, window)?;
        return Ok((rule, report));
    }

    /// Full regeneration: the rule's previously generated entries are
    /// deleted before the edit is persisted and the rule is
    /// rematerialized, in that order, so no transient duplicates are
    /// ever stored. Edits a user made to individual generated entries
    /// are lost.
    pub fn update_rule(
        &mut self,
        owner: &UserId,
        id: &RuleId,
        fields: RuleFields,
        window: &DateWindow,
    ) -> Result<(ScheduleRule, MaterializeReport), MaterializeError> {
        fields.validate()?;
        let mut report = self.delete_generated(owner, id)?;
        let rule = self.rules.update(id, fields)?;
        report.merge(self.generate_for_rule(owner, &rule, window)?);
        return Ok((rule, report));
    }

    /// Deletes a rule together with every entry it generated.
    pub fn delete_rule(
        &mut self,
        owner: &UserId,
        id: &RuleId,
    ) -> Result<MaterializeReport, StoreError> {
        let report = self.delete_generated(owner, id)?;
        self.rules.delete(id)?;
        return Ok(report);
    }

    fn generate_for_rule(
        &mut self,
        owner: &UserId,
        rule: &ScheduleRule,
        window: &DateWindow,
    ) -> Result<MaterializeReport, StoreError> {
        let mut report = MaterializeReport::default();
        if !rule.active {
            return Ok(report);
        }
        // A rule with no overlap is skipped silently; that is not a
        // failure.
        let Some(processing) = processing_window(rule, window) else {
            return Ok(report);
        };

        let existing = self.entries.list(owner)?;
        for date in candidate_dates(rule, &processing) {
            let already_stored = existing
                .iter()
                .any(|entry| entry.rule_id.as_ref() == Some(&rule.id) && entry.date == date);
            if already_stored {
                continue;
            }

            report.attempted_creates += 1;
            let outcome = self.entries.create(
                owner,
                NewEntry {
                    date,
                    amount: rule.amount,
                    description: tagged_description(&rule.description),
                    kind: rule.kind,
                    rule_id: Some(rule.id.clone()),
                },
            );
            match outcome {
                Ok(entry) => report.created.push(entry),
                // Keep going: each candidate is an independent create.
                Err(error) => report.failures.push(error),
            }
        }
        return Ok(report);
    }

    fn delete_generated(
        &mut self,
        owner: &UserId,
        id: &RuleId,
    ) -> Result<MaterializeReport, StoreError> {
        let mut report = MaterializeReport::default();
        for entry in self.entries.list(owner)? {
            if entry.rule_id.as_ref() != Some(id) {
                continue;
            }
            report.attempted_deletes += 1;
            match self.entries.delete(&entry.id) {
                Ok(()) => report.deleted += 1,
                Err(error) => report.failures.push(error),
            }
        }
        return Ok(report);
    }
}
