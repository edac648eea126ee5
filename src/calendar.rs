use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

/// Every date from `start` to `end`, both included, in ascending order.
/// An inverted range yields nothing.
pub fn days_between(start: &NaiveDate, end: &NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = *start;
    while current <= *end {
        days.push(current);
        current = current + Days::new(1);
    }
    return days;
}

pub fn is_weekend(date: &NaiveDate) -> bool {
    return matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
}

pub fn month_start(date: &NaiveDate) -> Result<NaiveDate, String> {
    return date
        .with_day(1)
        .ok_or("Could not compute the first day of the month".to_string());
}

pub fn month_end(date: &NaiveDate) -> Result<NaiveDate, String> {
    let next_month_start = (*date + Months::new(1))
        .with_day(1)
        .ok_or("Could not compute the first day of the next month".to_string())?;
    return next_month_start
        .pred_opt()
        .ok_or("Could not compute the last day of the month".to_string());
}
