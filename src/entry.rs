use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type Figure = Decimal;
pub type EntryId = String;
pub type RuleId = String;
pub type UserId = String;

pub const RECURRING_PREFIX: &str = "[Recurring] ";

/// The description carried by every entry generated from a rule.
pub fn tagged_description(rule_description: &str) -> String {
    return format!("{}{}", RECURRING_PREFIX, rule_description);
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

/// One concrete, dated financial event. Either entered by the user
/// directly, or materialized from a schedule rule, in which case
/// `rule_id` points back at the generating rule.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: EntryId,
    pub date: NaiveDate,
    pub amount: Figure,
    pub description: String,
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<RuleId>,
}

/// The fields of an entry about to be created; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub date: NaiveDate,
    pub amount: Figure,
    pub description: String,
    pub kind: EntryKind,
    pub rule_id: Option<RuleId>,
}
