use chrono::NaiveDate;
use derive_builder::Builder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entry::{EntryKind, Figure, RuleId};

pub mod generator;
pub mod window;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleType {
    /// Fires on a fixed day of the month (or of a fixed month, yearly).
    SpecificDate,
    /// Fires every Monday through Friday. The frequency field is ignored.
    WeekdaysOnly,
    /// Fires every Saturday and Sunday. The frequency field is ignored.
    WeekendsOnly,
    /// Fires on every date of the range, thinned out by the frequency.
    CustomRange,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// A recurrence policy: when and how much a recurring income or
/// expense fires.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScheduleRule {
    pub id: RuleId,
    pub description: String,
    pub amount: Figure,
    pub kind: EntryKind,
    pub schedule_type: ScheduleType,
    pub frequency: Frequency,
    /// Required when `schedule_type` is `SpecificDate`. Months shorter
    /// than this day yield no occurrence; there is no end-of-month
    /// clamping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    /// When generation may begin.
    pub start_date: NaiveDate,
    /// Inclusive upper bound on generation, independent of validity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// When the rule is considered live.
    pub valid_from: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDate>,
    /// Inactive rules generate nothing; their prior occurrences are
    /// kept until the rule itself is deleted.
    pub active: bool,
}

/// The fields of a rule about to be created or edited; the store
/// assigns the id.
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct RuleFields {
    pub description: String,
    pub amount: Figure,
    pub kind: EntryKind,
    pub schedule_type: ScheduleType,
    pub frequency: Frequency,
    #[builder(default)]
    pub day_of_month: Option<u32>,
    pub start_date: NaiveDate,
    #[builder(default)]
    pub end_date: Option<NaiveDate>,
    pub valid_from: NaiveDate,
    #[builder(default)]
    pub valid_until: Option<NaiveDate>,
    #[builder(default = "true")]
    pub active: bool,
}

impl RuleFields {
    pub fn with_id(self, id: RuleId) -> ScheduleRule {
        return ScheduleRule {
            id,
            description: self.description,
            amount: self.amount,
            kind: self.kind,
            schedule_type: self.schedule_type,
            frequency: self.frequency,
            day_of_month: self.day_of_month,
            start_date: self.start_date,
            end_date: self.end_date,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            active: self.active,
        };
    }

    /// Rejects a malformed rule before anything is written to a store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError {
                field: "amount",
                message: "Amount must be greater than zero".to_string(),
            });
        }

        match (self.schedule_type, self.day_of_month) {
            (ScheduleType::SpecificDate, None) => {
                return Err(ValidationError {
                    field: "day_of_month",
                    message: "A specific-date rule needs a day of the month".to_string(),
                });
            }
            (_, Some(day)) if !(1..=31).contains(&day) => {
                return Err(ValidationError {
                    field: "day_of_month",
                    message: format!("Day of month must be between 1 and 31, got {}", day),
                });
            }
            _ => {}
        }

        if let Some(end_date) = self.end_date {
            if end_date < self.start_date {
                return Err(ValidationError {
                    field: "end_date",
                    message: "End date is before the start date".to_string(),
                });
            }
        }

        if let Some(valid_until) = self.valid_until {
            if valid_until < self.valid_from {
                return Err(ValidationError {
                    field: "valid_until",
                    message: "Validity ends before it begins".to_string(),
                });
            }
        }

        return Ok(());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "Invalid {}: {}", self.field, self.message);
    }
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests_validate {
    use super::{EntryKind, Frequency, RuleFields, RuleFieldsBuilder, ScheduleType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(month: u32, day: u32) -> NaiveDate {
        return NaiveDate::from_ymd_opt(2024, month, day).unwrap();
    }

    fn salary_fields() -> RuleFieldsBuilder {
        return RuleFieldsBuilder::default()
            .description("Salary")
            .amount(dec!(1000))
            .kind(EntryKind::Income)
            .schedule_type(ScheduleType::SpecificDate)
            .frequency(Frequency::Monthly)
            .day_of_month(Some(15))
            .start_date(date(1, 1))
            .valid_from(date(1, 1))
            .clone();
    }

    fn assert_rejected(fields: RuleFields, field: &'static str) {
        assert_eq!(fields.validate().unwrap_err().field, field);
    }

    #[test]
    fn validate__nominal() {
        assert_eq!(salary_fields().build().unwrap().validate(), Ok(()));
    }

    #[test]
    fn validate__zero_amount() {
        let fields = salary_fields().amount(dec!(0)).build().unwrap();
        assert_rejected(fields, "amount");
    }

    #[test]
    fn validate__negative_amount() {
        let fields = salary_fields().amount(dec!(-3)).build().unwrap();
        assert_rejected(fields, "amount");
    }

    #[test]
    fn validate__specific_date_without_day_of_month() {
        let fields = salary_fields().day_of_month(None).build().unwrap();
        assert_rejected(fields, "day_of_month");
    }

    #[test]
    fn validate__day_of_month_zero() {
        let fields = salary_fields().day_of_month(Some(0)).build().unwrap();
        assert_rejected(fields, "day_of_month");
    }

    #[test]
    fn validate__day_of_month_past_thirty_one() {
        let fields = salary_fields().day_of_month(Some(32)).build().unwrap();
        assert_rejected(fields, "day_of_month");
    }

    #[test]
    fn validate__weekdays_rule_needs_no_day_of_month() {
        let fields = salary_fields()
            .schedule_type(ScheduleType::WeekdaysOnly)
            .day_of_month(None)
            .build()
            .unwrap();
        assert_eq!(fields.validate(), Ok(()));
    }

    #[test]
    fn validate__end_before_start() {
        let fields = salary_fields()
            .end_date(Some(date(1, 1)))
            .start_date(date(2, 1))
            .build()
            .unwrap();
        assert_rejected(fields, "end_date");
    }

    #[test]
    fn validate__end_equal_to_start_is_fine() {
        let fields = salary_fields()
            .end_date(Some(date(1, 1)))
            .build()
            .unwrap();
        assert_eq!(fields.validate(), Ok(()));
    }

    #[test]
    fn validate__valid_until_before_valid_from() {
        let fields = salary_fields()
            .valid_from(date(3, 1))
            .valid_until(Some(date(2, 1)))
            .build()
            .unwrap();
        assert_rejected(fields, "valid_until");
    }
}
