use chrono::{Days, NaiveDate};

use crate::calendar::{month_end, month_start};
use crate::schedule::ScheduleRule;

/// An inclusive range of calendar days.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// The default query window for materialization: it spans from 30
    /// days before today (so recently past occurrences still show up)
    /// or the start of the viewed month, whichever is earlier, to the
    /// end of today's month or of the viewed month, whichever is
    /// later.
    pub fn for_view(today: &NaiveDate, viewed: &NaiveDate) -> Result<DateWindow, String> {
        let past_cutoff = *today - Days::new(30);
        let start = past_cutoff.min(month_start(viewed)?);
        let end = month_end(today)?.max(month_end(viewed)?);
        return Ok(DateWindow { start, end });
    }
}

/// Clips a rule's generation range against the query window, or
/// signals that the rule is entirely out of range.
///
/// Validity dates are only used for the coarse overlap check; they do
/// not filter individual dates. A rule whose `start_date` predates
/// `valid_from` can therefore still generate occurrences before
/// `valid_from`, as long as the windows overlap at all.
pub fn processing_window(rule: &ScheduleRule, query: &DateWindow) -> Option<DateWindow> {
    if rule.valid_from > query.end {
        return None;
    }
    if let Some(valid_until) = rule.valid_until {
        if valid_until < query.start {
            return None;
        }
    }

    let start = rule.start_date.max(query.start);
    let end = match rule.end_date {
        Some(end_date) => end_date.min(query.end),
        None => query.end,
    };

    if start > end {
        return None;
    }

    return Some(DateWindow { start, end });
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests_processing_window {
    use super::{processing_window, DateWindow};
    use crate::entry::EntryKind;
    use crate::schedule::{Frequency, ScheduleRule, ScheduleType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(month: u32, day: u32) -> NaiveDate {
        return NaiveDate::from_ymd_opt(2024, month, day).unwrap();
    }

    fn rule() -> ScheduleRule {
        return ScheduleRule {
            id: "rule-1".to_string(),
            description: "Rent".to_string(),
            amount: dec!(800),
            kind: EntryKind::Expense,
            schedule_type: ScheduleType::SpecificDate,
            frequency: Frequency::Monthly,
            day_of_month: Some(1),
            start_date: date(1, 1),
            end_date: None,
            valid_from: date(1, 1),
            valid_until: None,
            active: true,
        };
    }

    fn january() -> DateWindow {
        return DateWindow {
            start: date(1, 1),
            end: date(1, 31),
        };
    }

    #[test]
    fn full_overlap() {
        assert_eq!(processing_window(&rule(), &january()), Some(january()));
    }

    #[test]
    fn rule_starts_mid_window() {
        let mut rule = rule();
        rule.start_date = date(1, 10);
        assert_eq!(
            processing_window(&rule, &january()),
            Some(DateWindow {
                start: date(1, 10),
                end: date(1, 31)
            })
        );
    }

    #[test]
    fn rule_ends_mid_window() {
        let mut rule = rule();
        rule.end_date = Some(date(1, 20));
        assert_eq!(
            processing_window(&rule, &january()),
            Some(DateWindow {
                start: date(1, 1),
                end: date(1, 20)
            })
        );
    }

    #[test]
    fn rule_end_past_window_is_clipped() {
        let mut rule = rule();
        rule.end_date = Some(date(3, 15));
        assert_eq!(processing_window(&rule, &january()), Some(january()));
    }

    #[test]
    fn validity_starts_after_window() {
        let mut rule = rule();
        rule.valid_from = date(2, 1);
        assert_eq!(processing_window(&rule, &january()), None);
    }

    #[test]
    fn validity_ends_before_window() {
        let mut rule = rule();
        rule.valid_until = Some(date(2, 15));
        let march = DateWindow {
            start: date(3, 1),
            end: date(3, 31),
        };
        assert_eq!(processing_window(&rule, &march), None);
    }

    #[test]
    fn missing_valid_until_means_open_ended() {
        let december = DateWindow {
            start: date(12, 1),
            end: date(12, 31),
        };
        assert_eq!(processing_window(&rule(), &december), Some(december));
    }

    #[test]
    fn rule_starts_after_window_end() {
        let mut rule = rule();
        rule.start_date = date(2, 1);
        assert_eq!(processing_window(&rule, &january()), None);
    }

    #[test]
    fn rule_ended_before_window_start() {
        let mut rule = rule();
        rule.end_date = Some(date(1, 31));
        let february = DateWindow {
            start: date(2, 1),
            end: date(2, 29),
        };
        assert_eq!(processing_window(&rule, &february), None);
    }

    #[test]
    fn validity_overlap_does_not_filter_individual_dates() {
        // valid_from sits mid-window, yet the processing window still
        // starts at the window start: validity is a coarse check only.
        let mut rule = rule();
        rule.valid_from = date(1, 15);
        assert_eq!(processing_window(&rule, &january()), Some(january()));
    }
}
