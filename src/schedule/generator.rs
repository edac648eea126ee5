use chrono::{Datelike, NaiveDate};

use crate::calendar::{days_between, is_weekend};
use crate::schedule::window::DateWindow;
use crate::schedule::{Frequency, ScheduleRule, ScheduleType};

/// The dates on which a rule fires within its processing window, in
/// ascending order, at most one per calendar day.
pub fn candidate_dates(rule: &ScheduleRule, window: &DateWindow) -> Vec<NaiveDate> {
    let all_days = days_between(&window.start, &window.end);

    return match rule.schedule_type {
        ScheduleType::SpecificDate => {
            let Some(day_of_month) = rule.day_of_month else {
                return vec![];
            };
            match rule.frequency {
                Frequency::Monthly => all_days
                    .into_iter()
                    .filter(|date| date.day() == day_of_month)
                    .collect(),
                Frequency::Yearly => all_days
                    .into_iter()
                    .filter(|date| {
                        date.day() == day_of_month && date.month() == rule.start_date.month()
                    })
                    .collect(),
                // A specific-date rule has no daily or weekly reading.
                Frequency::Daily | Frequency::Weekly => vec![],
            }
        }
        ScheduleType::WeekdaysOnly => all_days
            .into_iter()
            .filter(|date| !is_weekend(date))
            .collect(),
        ScheduleType::WeekendsOnly => all_days
            .into_iter()
            .filter(|date| is_weekend(date))
            .collect(),
        ScheduleType::CustomRange => match rule.frequency {
            Frequency::Daily => all_days,
            Frequency::Weekly => all_days
                .into_iter()
                .filter(|date| date.weekday() == rule.start_date.weekday())
                .collect(),
            Frequency::Monthly => all_days
                .into_iter()
                .filter(|date| date.day() == rule.start_date.day())
                .collect(),
            Frequency::Yearly => all_days
                .into_iter()
                .filter(|date| {
                    date.day() == rule.start_date.day()
                        && date.month() == rule.start_date.month()
                })
                .collect(),
        },
    };
}
